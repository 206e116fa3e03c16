use crate::CHANNEL_PAGE_PATH;
use crate::model::ice_server::IceServerEntry;

/// Everything a session needs to talk to a resolved room.
///
/// Built once by the resolver and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSignalingParameters {
    ice_servers: Vec<IceServerEntry>,
    base_url: String,
    channel_token: String,
    post_message_path: String,
}

impl RoomSignalingParameters {
    pub fn new(
        ice_servers: Vec<IceServerEntry>,
        base_url: impl Into<String>,
        channel_token: impl Into<String>,
        post_message_path: impl Into<String>,
    ) -> Self {
        Self {
            ice_servers,
            base_url: base_url.into(),
            channel_token: channel_token.into(),
            post_message_path: post_message_path.into(),
        }
    }

    pub fn ice_servers(&self) -> &[IceServerEntry] {
        &self.ice_servers
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn channel_token(&self) -> &str {
        &self.channel_token
    }

    pub fn post_message_path(&self) -> &str {
        &self.post_message_path
    }

    /// Endpoint outbound messages are POSTed to.
    pub fn post_message_url(&self) -> String {
        format!("{}{}", self.base_url, self.post_message_path)
    }

    /// URL of the inbound notification channel for this room.
    pub fn channel_url(&self) -> String {
        format!(
            "{}{}?token={}",
            self.base_url, CHANNEL_PAGE_PATH, self.channel_token
        )
    }
}
