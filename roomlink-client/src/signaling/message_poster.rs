use crate::error::SignalingError;
use async_trait::async_trait;
use tracing::debug;

/// Delivers one outbound signaling message to the room service.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    /// Succeeds only on a 2xx answer.
    async fn post(&self, url: &str, body: &str) -> Result<(), SignalingError>;
}

pub struct HttpMessagePoster {
    http: reqwest::Client,
}

impl HttpMessagePoster {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessagePoster for HttpMessagePoster {
    async fn post(&self, url: &str, body: &str) -> Result<(), SignalingError> {
        let response = self
            .http
            .post(url)
            .body(body.to_owned())
            .send()
            .await
            .map_err(|e| SignalingError::Delivery(format!("POST to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignalingError::Delivery(format!(
                "non-success response {status} to POST for msg: {body}"
            )));
        }

        debug!("Delivered {} bytes to {}", body.len(), url);
        Ok(())
    }
}
