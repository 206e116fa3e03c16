pub mod model;

pub use model::*;

/// Path appended to a room's base URL to reach the inbound notification channel.
pub const CHANNEL_PAGE_PATH: &str = "html/android_channel.html";
