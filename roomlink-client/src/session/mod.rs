mod pending_candidates;
mod session;
mod session_command;
mod session_observer;
mod termination;

pub use pending_candidates::*;
pub use session::*;
pub use session_command::*;
pub use session_observer::*;
pub use termination::*;
