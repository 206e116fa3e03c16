use roomlink_core::IceCandidate;

/// Events the peer connection raises on its own tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A local candidate to trickle to the remote side.
    LocalCandidate(IceCandidate),
    Connected,
    Failed(String),
}
