use crate::error::SignalingError;
use crate::transport::peer_event::PeerEvent;
use async_trait::async_trait;
use roomlink_core::{IceCandidate, IceServerEntry, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The peer connection as seen by the negotiation state machine.
#[async_trait]
pub trait PeerLink: Send + Sync {
    /// Creates an offer that asks to receive both audio and video.
    async fn create_offer(&self) -> Result<SessionDescription, SignalingError>;

    async fn set_local_description(&self, desc: SessionDescription)
    -> Result<(), SignalingError>;

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SignalingError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError>;

    async fn close(&self) -> Result<(), SignalingError>;
}

/// Builds a [`PeerLink`] once a room's ICE servers are known.
#[async_trait]
pub trait PeerLinkFactory: Send + Sync {
    async fn create(
        &self,
        ice_servers: &[IceServerEntry],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Arc<dyn PeerLink>, SignalingError>;
}
