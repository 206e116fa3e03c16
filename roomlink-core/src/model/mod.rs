mod ice_server;
mod room;
mod session;
mod signaling;

pub use ice_server::{IceConfig, IceServerEntry};
pub use room::RoomSignalingParameters;
pub use session::{SessionId, SessionState};
pub use signaling::{IceCandidate, SdpKind, SessionDescription, SignalMessage};
