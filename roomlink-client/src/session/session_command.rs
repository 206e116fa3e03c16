/// Requests sent to a running session through its handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// The local user left.
    Hangup,
}
