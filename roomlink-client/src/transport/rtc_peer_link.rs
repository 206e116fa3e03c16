use crate::config::ClientConfig;
use crate::error::SignalingError;
use crate::transport::peer_event::PeerEvent;
use crate::transport::peer_link::{PeerLink, PeerLinkFactory};
use async_trait::async_trait;
use roomlink_core::{IceCandidate, IceServerEntry, SdpKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;

/// Creates `webrtc` peer connections that only receive media.
pub struct RtcPeerLinkFactory {
    fallback_stun_server: Option<String>,
}

impl RtcPeerLinkFactory {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            fallback_stun_server: config.fallback_stun_server.clone(),
        }
    }

    fn rtc_ice_servers(&self, ice_servers: &[IceServerEntry]) -> Vec<RTCIceServer> {
        if ice_servers.is_empty() {
            return self
                .fallback_stun_server
                .iter()
                .map(|url| RTCIceServer {
                    urls: vec![url.clone()],
                    ..Default::default()
                })
                .collect();
        }

        ice_servers
            .iter()
            .map(|entry| {
                let (username, url) = entry.split_username();
                RTCIceServer {
                    urls: vec![url],
                    username,
                    credential: entry.credential.clone(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl PeerLinkFactory for RtcPeerLinkFactory {
    async fn create(
        &self,
        ice_servers: &[IceServerEntry],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Arc<dyn PeerLink>, SignalingError> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: self.rtc_ice_servers(ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Receive-only transceivers make the offer ask for audio and video.
        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Recvonly,
                        send_encodings: vec![],
                    }),
                )
                .await?;
        }

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {}", state);
                    let event = match state {
                        RTCPeerConnectionState::Connected => PeerEvent::Connected,
                        RTCPeerConnectionState::Failed => {
                            PeerEvent::Failed("ICE connectivity failed".to_owned())
                        }
                        _ => return,
                    };
                    let _ = tx.send(event).await;
                })
            },
        ));

        let ice_tx = events;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Dropping unserializable local candidate: {}", e);
                        return;
                    }
                };
                debug!("Local ICE candidate: {}", init.candidate);
                let candidate = IceCandidate::new(
                    init.sdp_mid.unwrap_or_default(),
                    init.sdp_mline_index.unwrap_or_default(),
                    init.candidate,
                );
                let _ = tx.send(PeerEvent::LocalCandidate(candidate)).await;
            })
        }));

        Ok(Arc::new(RtcPeerLink { peer_connection }))
    }
}

pub struct RtcPeerLink {
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerLink {
    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, SignalingError> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        Ok(rtc)
    }
}

#[async_trait]
impl PeerLink for RtcPeerLink {
    async fn create_offer(&self) -> Result<SessionDescription, SignalingError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SignalingError> {
        self.peer_connection
            .set_local_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SignalingError> {
        self.peer_connection
            .set_remote_description(Self::to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: Some(candidate.sdp_mid),
            sdp_mline_index: Some(candidate.sdp_mline_index),
            username_fragment: None,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SignalingError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
