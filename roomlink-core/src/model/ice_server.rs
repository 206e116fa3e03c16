use serde::{Deserialize, Serialize};

/// A STUN/TURN endpoint advertised by a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerEntry {
    pub url: String,
    #[serde(default)]
    pub credential: String,
}

impl IceServerEntry {
    pub fn new(url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credential: credential.into(),
        }
    }

    /// Splits a `turn:user@host` style URL into `(username, url without user)`.
    ///
    /// Entries without a user part return an empty username and the URL unchanged.
    pub fn split_username(&self) -> (String, String) {
        let Some((scheme, rest)) = self.url.split_once(':') else {
            return (String::new(), self.url.clone());
        };
        if !scheme.starts_with("turn") {
            return (String::new(), self.url.clone());
        }
        match rest.split_once('@') {
            Some((user, host)) => (user.to_owned(), format!("{scheme}:{host}")),
            None => (String::new(), self.url.clone()),
        }
    }
}

/// Peer-connection configuration blob embedded in a room page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceConfig {
    #[serde(rename = "iceServers")]
    pub ice_servers: Vec<IceServerEntry>,
}

impl IceConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
