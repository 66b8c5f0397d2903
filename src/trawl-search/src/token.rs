//! Cancellation and deadline handling for one search invocation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Cancellation signal threaded through a single search.
///
/// Clones share the same flag, so a caller can keep one handle and cancel
/// from another thread while the search runs. The deadline is fixed when the
/// token is created.
#[derive(Debug, Clone, Default)]
pub struct SearchToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl SearchToken {
    /// Creates a token without a deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Creates a token that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancelled or past the deadline.
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::Relaxed) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline. `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_live() {
        let token = SearchToken::new();
        assert!(!token.is_cancelled());
        assert!(token.deadline().is_none());
        assert!(token.remaining().is_none());
    }

    #[test]
    fn test_cancel_propagates_to_clones() {
        let token = SearchToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_expired_deadline() {
        let token = SearchToken::with_deadline(Instant::now());
        assert!(token.is_cancelled());
        assert_eq!(token.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_future_deadline() {
        let token = SearchToken::with_timeout(Duration::from_secs(60));
        assert!(!token.is_cancelled());
        assert!(token.remaining().unwrap() > Duration::from_secs(30));
    }
}
