use async_trait::async_trait;
use roomlink_client::{MessagePoster, SignalingError};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One recorded POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub url: String,
    pub body: String,
}

/// MessagePoster that records deliveries instead of sending them.
///
/// # Example
///
/// ```ignore
/// let poster = MockPoster::failing_after(2);
/// // ... two posts succeed, the third fails ...
/// poster.recover();
/// ```
#[derive(Clone, Default)]
pub struct MockPoster {
    posts: Arc<Mutex<Vec<Post>>>,
    attempts: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    fail_after: Option<usize>,
    recovered: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockPoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `delivered` posts, then rejects every post until [`MockPoster::recover`].
    pub fn failing_after(delivered: usize) -> Self {
        Self {
            fail_after: Some(delivered),
            ..Self::default()
        }
    }

    /// Holds every post for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn recover(&self) {
        self.recovered.store(true, Ordering::SeqCst);
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.lock().await.clone()
    }

    pub async fn bodies(&self) -> Vec<String> {
        self.posts
            .lock()
            .await
            .iter()
            .map(|p| p.body.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Highest number of posts that were ever in progress at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` posts were delivered.
    pub async fn wait_for_posts(&self, count: usize, timeout_ms: u64) -> bool {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            if self.posts.lock().await.len() >= count {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl MessagePoster for MockPoster {
    async fn post(&self, url: &str, body: &str) -> Result<(), SignalingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut posts = self.posts.lock().await;
        let result = match self.fail_after {
            Some(limit) if posts.len() >= limit && !self.recovered.load(Ordering::SeqCst) => {
                Err(SignalingError::Delivery(format!("rejected: {body}")))
            }
            _ => {
                tracing::debug!("[MockPoster] {} <- {}", url, body);
                posts.push(Post {
                    url: url.to_owned(),
                    body: body.to_owned(),
                });
                Ok(())
            }
        };
        drop(posts);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
