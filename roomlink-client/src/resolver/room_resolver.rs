use crate::config::ClientConfig;
use crate::error::SignalingError;
use crate::resolver::page_scraper::{HtmlPageScraper, ParameterExtractor};
use async_trait::async_trait;
use reqwest::{StatusCode, header};
use roomlink_core::RoomSignalingParameters;
use tracing::{debug, info};
use url::Url;

/// Source of signaling parameters for a room URL.
#[async_trait]
pub trait RoomParameterSource: Send + Sync {
    async fn resolve(&self, room_url: &str) -> Result<RoomSignalingParameters, SignalingError>;
}

/// Resolves short room URLs by walking `302` redirects and scraping the final page.
pub struct RoomResolver {
    http: reqwest::Client,
    extractor: Box<dyn ParameterExtractor>,
    max_redirects: usize,
}

impl RoomResolver {
    /// `http` must not follow redirects on its own; see [`ClientConfig::http_client`].
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            extractor: Box::new(HtmlPageScraper),
            max_redirects: config.max_redirects,
        }
    }

    pub fn with_extractor(mut self, extractor: impl ParameterExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Returns the `Location` of a `302` answer to `url`.
    async fn follow_redirect(&self, url: &str) -> Result<String, SignalingError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SignalingError::Redirect(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::FOUND {
            return Err(SignalingError::Redirect(format!(
                "unexpected response {status} for {url}"
            )));
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .ok_or_else(|| SignalingError::Redirect(format!("no Location header from {url}")))?
            .to_str()
            .map_err(|e| SignalingError::Redirect(format!("unreadable Location from {url}: {e}")))?;

        Url::parse(url)
            .and_then(|current| current.join(location))
            .map(String::from)
            .map_err(|e| SignalingError::Redirect(format!("bad Location {location:?}: {e}")))
    }

    async fn fetch_page(&self, url: &str) -> Result<String, SignalingError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SignalingError::PageFetch(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignalingError::PageFetch(format!(
                "unexpected response {status} for {url}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SignalingError::PageFetch(format!("reading {url} failed: {e}")))
    }
}

#[async_trait]
impl RoomParameterSource for RoomResolver {
    async fn resolve(&self, room_url: &str) -> Result<RoomSignalingParameters, SignalingError> {
        let mut url = room_url.to_owned();
        let mut hops = 0;

        // Short room links redirect until the URL names a room.
        while !url.contains('?') {
            if hops == self.max_redirects {
                return Err(SignalingError::Redirect(format!(
                    "gave up after {hops} redirects resolving {room_url}"
                )));
            }
            let next = self.follow_redirect(&url).await?;
            debug!("Room URL {} redirected to {}", url, next);
            url = next;
            hops += 1;
        }

        let html = self.fetch_page(&url).await?;
        let params = self.extractor.extract(&url, &html)?;

        info!(
            "Resolved room {} ({} ICE servers)",
            params.base_url(),
            params.ice_servers().len()
        );
        Ok(params)
    }
}
