use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a single room connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    ResolvingRoom,
    AwaitingChannel,
    Negotiating,
    Connected,
    Terminated,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Terminated)
    }

    /// States in which inbound signaling messages are accepted.
    pub fn accepts_signals(self) -> bool {
        matches!(
            self,
            SessionState::AwaitingChannel | SessionState::Negotiating | SessionState::Connected
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::ResolvingRoom => "resolving-room",
            SessionState::AwaitingChannel => "awaiting-channel",
            SessionState::Negotiating => "negotiating",
            SessionState::Connected => "connected",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
