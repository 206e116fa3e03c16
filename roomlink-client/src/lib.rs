mod config;
mod error;
mod resolver;
mod session;
mod signaling;
mod transport;

pub use config::*;
pub use error::*;
pub use resolver::*;
pub use session::*;
pub use signaling::*;
pub use transport::*;

pub use roomlink_core::*;
