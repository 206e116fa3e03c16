use std::time::Duration;

/// Tunables for the HTTP side of a session and the peer connection defaults.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on establishing a TCP/TLS connection.
    pub connect_timeout: Duration,
    /// Upper bound on a whole request, headers and body included.
    pub request_timeout: Duration,
    /// Redirect hops followed before the room URL must carry a query.
    pub max_redirects: usize,
    /// Used only when a room advertises no ICE servers at all.
    pub fallback_stun_server: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            max_redirects: 10,
            fallback_stun_server: Some("stun:stun.l.google.com:19302".to_owned()),
        }
    }
}

impl ClientConfig {
    /// HTTP client shared by the resolver and the message poster.
    ///
    /// Redirects are never followed automatically; the resolver walks them itself.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
    }
}
