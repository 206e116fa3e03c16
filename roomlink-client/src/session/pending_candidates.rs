use roomlink_core::IceCandidate;

/// Remote candidates that arrived before the remote description was accepted.
///
/// Once released the buffer is gone for good and every later candidate is
/// handed straight back to the caller.
#[derive(Debug)]
pub struct PendingCandidates {
    buffered: Option<Vec<IceCandidate>>,
}

impl Default for PendingCandidates {
    fn default() -> Self {
        Self {
            buffered: Some(Vec::new()),
        }
    }
}

impl PendingCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `candidate` if still buffering, otherwise returns it for immediate use.
    pub fn admit(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        match &mut self.buffered {
            Some(buffer) => {
                buffer.push(candidate);
                None
            }
            None => Some(candidate),
        }
    }

    /// Takes the buffered candidates in arrival order and stops buffering.
    pub fn release(&mut self) -> Vec<IceCandidate> {
        self.buffered.take().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.buffered.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
