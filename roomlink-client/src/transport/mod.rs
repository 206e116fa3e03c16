mod peer_event;
mod peer_link;
mod rtc_peer_link;

pub use peer_event::*;
pub use peer_link::*;
pub use rtc_peer_link::*;
