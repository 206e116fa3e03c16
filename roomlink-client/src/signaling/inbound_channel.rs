use crate::error::SignalingError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Events pushed by the room service's notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Message(String),
    Closed,
    Error { code: i32, description: String },
}

/// Push channel carrying messages from the remote peer.
#[async_trait]
pub trait InboundChannel: Send + Sync {
    /// Starts connecting to `url`. Progress and failures after this call are
    /// reported through `events`.
    async fn open(
        &self,
        url: &str,
        events: mpsc::Sender<ChannelEvent>,
    ) -> Result<(), SignalingError>;

    /// Stops delivering events. Must be safe to call repeatedly.
    async fn close(&self);
}
