use crate::error::SignalingError;
use crate::signaling::inbound_channel::{ChannelEvent, InboundChannel};
use crate::signaling::message_poster::MessagePoster;
use roomlink_core::{RoomSignalingParameters, SignalMessage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::{debug, error, info, warn};

/// Outbound queue plus inbound channel for one room session.
///
/// Messages may be queued before the room is resolved; they are POSTed in
/// enqueue order once [`SignalingChannel::set_parameters`] has been called.
pub struct SignalingChannel {
    params: OnceLock<Arc<RoomSignalingParameters>>,
    queue: Mutex<VecDeque<String>>,
    // Held across POSTs so flushes never interleave.
    flush_lock: AsyncMutex<()>,
    poster: Arc<dyn MessagePoster>,
    inbound: Arc<dyn InboundChannel>,
    opened: AtomicBool,
    failures: mpsc::UnboundedSender<SignalingError>,
}

impl SignalingChannel {
    /// Background flush failures are reported on the returned receiver.
    pub fn new(
        poster: Arc<dyn MessagePoster>,
        inbound: Arc<dyn InboundChannel>,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<SignalingError>) {
        let (failures, failures_rx) = mpsc::unbounded_channel();
        let channel = Arc::new(Self {
            params: OnceLock::new(),
            queue: Mutex::new(VecDeque::new()),
            flush_lock: AsyncMutex::new(()),
            poster,
            inbound,
            opened: AtomicBool::new(false),
            failures,
        });
        (channel, failures_rx)
    }

    /// Records the room parameters. Only the first call has any effect.
    pub fn set_parameters(&self, params: Arc<RoomSignalingParameters>) -> bool {
        if self.params.set(params).is_err() {
            warn!("Signaling parameters already set; ignoring new ones");
            return false;
        }
        true
    }

    pub fn parameters(&self) -> Option<&Arc<RoomSignalingParameters>> {
        self.params.get()
    }

    pub fn len(&self) -> usize {
        self.queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue().is_empty()
    }

    /// Snapshot of the messages still waiting for delivery, oldest first.
    pub fn queued(&self) -> Vec<String> {
        self.queue().iter().cloned().collect()
    }

    /// Appends `message` and requests a flush on a background task.
    pub fn enqueue(self: &Arc<Self>, message: impl Into<String>) {
        self.queue().push_back(message.into());
        self.request_flush();
    }

    pub fn enqueue_signal(self: &Arc<Self>, message: &SignalMessage) -> Result<(), SignalingError> {
        let json = message
            .to_json()
            .map_err(|e| SignalingError::Protocol(format!("cannot encode {}: {e}", message.kind())))?;
        self.enqueue(json);
        Ok(())
    }

    /// Appends `message` and flushes on the caller's task.
    pub async fn deliver(&self, message: impl Into<String>) -> Result<usize, SignalingError> {
        self.queue().push_back(message.into());
        self.flush().await
    }

    pub fn request_flush(self: &Arc<Self>) {
        let channel = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = channel.flush().await {
                error!("Background flush failed: {}", e);
                let _ = channel.failures.send(e);
            }
        });
    }

    /// POSTs queued messages oldest first and returns how many were delivered.
    ///
    /// Without parameters this is a no-op. A failed POST stops the flush; the
    /// failed message and everything after it stay queued.
    pub async fn flush(&self) -> Result<usize, SignalingError> {
        let _flushing = self.flush_lock.lock().await;

        let Some(params) = self.params.get() else {
            debug!("Flush deferred: {} messages waiting for room parameters", self.len());
            return Ok(0);
        };
        let url = params.post_message_url();

        let mut delivered = 0;
        loop {
            // Only a flush removes messages, so the front stays put while we POST it.
            let Some(message) = self.queue().front().cloned() else {
                break;
            };
            self.poster.post(&url, &message).await?;
            self.queue().pop_front();
            delivered += 1;
        }

        if delivered > 0 {
            debug!("Flushed {} signaling messages", delivered);
        }
        Ok(delivered)
    }

    /// Opens the inbound channel for the resolved room.
    pub async fn open(&self, events: mpsc::Sender<ChannelEvent>) -> Result<(), SignalingError> {
        let params = self
            .params
            .get()
            .ok_or_else(|| SignalingError::Channel("room parameters not resolved".to_owned()))?;

        let url = params.channel_url();
        info!("Opening signaling channel {}", url);
        self.opened.store(true, Ordering::Release);
        self.inbound.open(&url, events).await
    }

    /// Tears down the inbound channel. Repeated calls, or calls before
    /// [`SignalingChannel::open`], do nothing.
    pub async fn close(&self) {
        if !self.opened.swap(false, Ordering::AcqRel) {
            return;
        }
        self.inbound.close().await;
        info!("Signaling channel closed");
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
