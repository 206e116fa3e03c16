use crate::error::SignalingError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Why a session ended.
#[derive(Debug)]
pub enum TerminationReason {
    LocalHangup,
    RemoteHangup,
    Failed(SignalingError),
}

impl TerminationReason {
    pub fn is_failure(&self) -> bool {
        matches!(self, TerminationReason::Failed(_))
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::LocalHangup => f.write_str("local hangup"),
            TerminationReason::RemoteHangup => {
                f.write_str("remote end hung up; dropping peer connection")
            }
            TerminationReason::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl From<SignalingError> for TerminationReason {
    fn from(e: SignalingError) -> Self {
        TerminationReason::Failed(e)
    }
}

/// Set-once flag guarding the teardown sequence.
#[derive(Debug, Clone, Default)]
pub struct TeardownGuard(Arc<AtomicBool>);

impl TeardownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for exactly one caller across all clones.
    pub fn try_begin(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_done(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
