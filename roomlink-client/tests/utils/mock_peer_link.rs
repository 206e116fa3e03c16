use async_trait::async_trait;
use roomlink_client::{
    IceCandidate, IceServerEntry, PeerEvent, PeerLink, PeerLinkFactory, SessionDescription,
    SignalingError,
};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub const MOCK_OFFER_SDP: &str = "v=0\r\nmock-offer\r\n";

/// Calls made on the peer connection, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerCall {
    CreateOffer,
    SetLocal(SessionDescription),
    SetRemote(SessionDescription),
    AddCandidate(IceCandidate),
    Close,
}

/// PeerLink that records calls; also acts as its own factory.
#[derive(Clone, Default)]
pub struct MockPeerLink {
    calls: Arc<Mutex<Vec<PeerCall>>>,
    events: Arc<Mutex<Option<mpsc::Sender<PeerEvent>>>>,
    ice_servers: Arc<Mutex<Vec<IceServerEntry>>>,
    reject_remote: bool,
    reject_candidates: bool,
}

impl MockPeerLink {
    /// Fails every `set_remote_description`.
    pub fn rejecting_remote() -> Self {
        Self {
            reject_remote: true,
            ..Self::default()
        }
    }

    /// Fails every `add_ice_candidate`.
    pub fn rejecting_candidates() -> Self {
        Self {
            reject_candidates: true,
            ..Self::default()
        }
    }

    pub async fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().await.clone()
    }

    pub async fn added_candidates(&self) -> Vec<IceCandidate> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                PeerCall::AddCandidate(candidate) => Some(candidate.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn count(&self, call: fn(&PeerCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| call(c)).count()
    }

    /// ICE servers the factory was asked to build with.
    pub async fn ice_servers(&self) -> Vec<IceServerEntry> {
        self.ice_servers.lock().await.clone()
    }

    /// Raises a peer event as the real connection would.
    pub async fn emit(&self, event: PeerEvent) -> bool {
        let sender = self.events.lock().await.clone();
        match sender {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Wait until `count` calls were recorded.
    pub async fn wait_for_calls(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.calls.lock().await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    async fn record(&self, call: PeerCall) {
        tracing::debug!("[MockPeer] {:?}", call);
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl PeerLink for MockPeerLink {
    async fn create_offer(&self) -> Result<SessionDescription, SignalingError> {
        self.record(PeerCall::CreateOffer).await;
        Ok(SessionDescription::offer(MOCK_OFFER_SDP))
    }

    async fn set_local_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SignalingError> {
        self.record(PeerCall::SetLocal(desc)).await;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), SignalingError> {
        self.record(PeerCall::SetRemote(desc)).await;
        if self.reject_remote {
            return Err(SignalingError::PeerConnection("remote rejected".to_owned()));
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SignalingError> {
        self.record(PeerCall::AddCandidate(candidate)).await;
        if self.reject_candidates {
            return Err(SignalingError::PeerConnection("candidate rejected".to_owned()));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), SignalingError> {
        self.record(PeerCall::Close).await;
        Ok(())
    }
}

#[async_trait]
impl PeerLinkFactory for MockPeerLink {
    async fn create(
        &self,
        ice_servers: &[IceServerEntry],
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Arc<dyn PeerLink>, SignalingError> {
        *self.ice_servers.lock().await = ice_servers.to_vec();
        *self.events.lock().await = Some(events);
        Ok(Arc::new(self.clone()))
    }
}
