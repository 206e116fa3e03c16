mod inbound_channel;
mod message_poster;
mod signaling_channel;
mod ws_channel;

pub use inbound_channel::*;
pub use message_poster::*;
pub use signaling_channel::*;
pub use ws_channel::*;
