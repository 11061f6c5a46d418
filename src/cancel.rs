//! Stop flag shared between a tail worker and whoever may end it.
//!
//! The worker only reads the flag between cycles, so setting it never
//! interrupts a read in progress. Handles are cheap to clone; a caller can
//! hand the same token to several workers to stop them together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag
    ///
    /// Returns `true` only for the call that actually flipped it, so a
    /// stop requested from several places is acted on once.
    pub fn cancel(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_cancel_flips() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_handles_share_one_flag() {
        let worker_side = CancelToken::new();
        let deadline = worker_side.clone();

        assert!(deadline.cancel());
        // Already set through the other handle
        assert!(!worker_side.cancel());
        assert!(worker_side.is_cancelled());
    }
}
