use std::fmt;
use thiserror::Error;

/// Page fragment a room page must contain exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFragment {
    ChannelToken,
    PostPath,
    IceConfig,
}

impl fmt::Display for PageFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageFragment::ChannelToken => f.write_str("channel token"),
            PageFragment::PostPath => f.write_str("post path"),
            PageFragment::IceConfig => f.write_str("ice config"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("room redirect failed: {0}")]
    Redirect(String),

    #[error("room is full")]
    RoomFull,

    #[error("malformed room page: expected exactly one {fragment}, found {found}")]
    MalformedPage { fragment: PageFragment, found: usize },

    #[error("failed to fetch room page: {0}")]
    PageFetch(String),

    #[error("invalid ice config: {0}")]
    InvalidIceConfig(#[source] serde_json::Error),

    #[error("message delivery failed: {0}")]
    Delivery(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("signaling channel error: {0}")]
    Channel(String),

    #[error("peer connection error: {0}")]
    PeerConnection(String),
}

impl SignalingError {
    pub fn malformed(fragment: PageFragment, found: usize) -> Self {
        SignalingError::MalformedPage { fragment, found }
    }

    pub fn unexpected_message(text: &str) -> Self {
        SignalingError::Protocol(format!("unexpected message: {text}"))
    }
}

impl From<webrtc::Error> for SignalingError {
    fn from(e: webrtc::Error) -> Self {
        SignalingError::PeerConnection(e.to_string())
    }
}
