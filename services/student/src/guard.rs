//! Duplicate-submission guard

use common::SessionId;

/// Remembers the session of the last acknowledged submission
///
/// Holds a single session id, not a history: after recording A then B, a
/// fresh scan of A is submitted again and left to the server to reject.
#[derive(Debug, Clone, Default)]
pub struct DuplicateGuard {
    last: Option<SessionId>,
}

impl DuplicateGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_duplicate(&self, session_id: &SessionId) -> bool {
        self.last.as_ref() == Some(session_id)
    }

    pub fn remember(&mut self, session_id: SessionId) {
        self.last = Some(session_id);
    }

    pub fn last(&self) -> Option<&SessionId> {
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_guard_allows_everything() {
        let guard = DuplicateGuard::new();
        assert!(!guard.is_duplicate(&SessionId::new("s1")));
        assert_eq!(guard.last(), None);
    }

    #[test]
    fn test_only_last_session_is_remembered() {
        let mut guard = DuplicateGuard::new();
        let (a, b) = (SessionId::new("a"), SessionId::new("b"));

        guard.remember(a.clone());
        assert!(guard.is_duplicate(&a));
        assert!(!guard.is_duplicate(&b));

        guard.remember(b.clone());
        assert!(guard.is_duplicate(&b));
        assert!(!guard.is_duplicate(&a));
    }
}
