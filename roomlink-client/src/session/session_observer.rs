use crate::session::termination::TerminationReason;
use async_trait::async_trait;
use roomlink_core::{IceServerEntry, SessionState};

/// Hooks for whoever drives the session (UI, CLI).
#[async_trait]
pub trait SessionObserver: Send + Sync + 'static {
    /// Called once the room has been resolved, before the peer connection is built.
    async fn on_ice_servers_ready(&self, _ice_servers: &[IceServerEntry]) {}

    async fn on_state_changed(&self, _state: SessionState) {}

    /// Called exactly once per session.
    async fn on_terminated(&self, reason: &TerminationReason);
}

/// Observer that ignores everything.
pub struct NoopObserver;

#[async_trait]
impl SessionObserver for NoopObserver {
    async fn on_terminated(&self, _reason: &TerminationReason) {}
}
