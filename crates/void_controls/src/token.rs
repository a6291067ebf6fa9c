//! Cooperative cancellation token

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Abortable flag shared between a session and whoever may cancel it.
///
/// Clones share the flag. Two tokens are the same session only if they were
/// cloned from one another, see [`CancelToken::same_session`].
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    aborted: Arc<AtomicBool>,
}

impl CancelToken {
    /// Mint a fresh token
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the session. Idempotent.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Whether the session was aborted
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Identity comparison
    pub fn same_session(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.aborted, &other.aborted)
    }
}

/// Whether `token` is the one held in `slot`
pub(crate) fn is_current(slot: &Option<CancelToken>, token: &CancelToken) -> bool {
    slot.as_ref().is_some_and(|current| current.same_session(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_is_monotonic() {
        let token = CancelToken::new();
        assert!(!token.is_aborted());

        token.abort();
        token.abort();
        assert!(token.is_aborted());
    }

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let held = token.clone();
        held.abort();

        assert!(token.is_aborted());
        assert!(token.same_session(&held));
    }

    #[test]
    fn test_identity_independent_of_flag() {
        let a = CancelToken::new();
        let b = CancelToken::new();
        assert!(!a.same_session(&b));

        let slot = Some(b.clone());
        assert!(is_current(&slot, &b));
        assert!(!is_current(&slot, &a));
        assert!(!is_current(&None, &a));
    }
}
