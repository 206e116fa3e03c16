use crate::error::{PageFragment, SignalingError};
use regex::{Captures, Regex};
use roomlink_core::{IceConfig, RoomSignalingParameters};
use std::sync::LazyLock;

static ROOM_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ *Sorry, this room is full\.").expect("room-full pattern"));

static CHANNEL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ *openChannel\('([^']*)'\);\r?$").expect("channel-token pattern")
});

static POST_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ *path = '/(message\?r=[0-9]+)' \+ '(&u=[0-9]+)';\r?$")
        .expect("post-path pattern")
});

static PC_CONFIG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ *var pc_config = (\{.*\});\r?$").expect("pc-config pattern")
});

/// Turns a fetched room page into signaling parameters.
///
/// Implementations must fail with [`SignalingError::RoomFull`] when the room
/// refuses new participants, and with [`SignalingError::MalformedPage`] unless
/// the channel token, the post path and the ICE configuration are each found
/// exactly once.
pub trait ParameterExtractor: Send + Sync {
    fn extract(&self, room_url: &str, body: &str)
    -> Result<RoomSignalingParameters, SignalingError>;
}

/// Scrapes the parameters out of the room's HTML.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlPageScraper;

impl ParameterExtractor for HtmlPageScraper {
    fn extract(
        &self,
        room_url: &str,
        html: &str,
    ) -> Result<RoomSignalingParameters, SignalingError> {
        if ROOM_FULL.is_match(html) {
            return Err(SignalingError::RoomFull);
        }

        let token = exactly_one(&CHANNEL_TOKEN, html, PageFragment::ChannelToken)?[1].to_owned();

        let post = exactly_one(&POST_PATH, html, PageFragment::PostPath)?;
        let post_message_path = format!("{}{}", &post[1], &post[2]);

        let pc_config = exactly_one(&PC_CONFIG, html, PageFragment::IceConfig)?;
        let ice_config =
            IceConfig::from_json(&pc_config[1]).map_err(SignalingError::InvalidIceConfig)?;

        Ok(RoomSignalingParameters::new(
            ice_config.ice_servers,
            base_url(room_url),
            token,
            post_message_path,
        ))
    }
}

/// The room URL with its query removed.
pub fn base_url(room_url: &str) -> &str {
    room_url
        .split_once('?')
        .map_or(room_url, |(base, _query)| base)
}

fn exactly_one<'h>(
    pattern: &Regex,
    html: &'h str,
    fragment: PageFragment,
) -> Result<Captures<'h>, SignalingError> {
    let mut matches = pattern.captures_iter(html);
    let first = matches
        .next()
        .ok_or_else(|| SignalingError::malformed(fragment, 0))?;

    let extra = matches.count();
    if extra > 0 {
        return Err(SignalingError::malformed(fragment, extra + 1));
    }
    Ok(first)
}
