//! Cancellation scopes for request execution.
//!
//! A [`Scope`] bounds how long an execution may run. It ends either when it
//! is cancelled explicitly or when its deadline passes. Scopes form a tree:
//! a child ends when its parent ends, and its deadline is never later than
//! the parent's.
//!
//! ```ignore
//! let scope = Scope::background().with_timeout(Duration::from_secs(5));
//! let body = request.execute_with_scope(&scope).await?;
//! ```

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Why a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEnd {
    Cancelled,
    DeadlineExceeded,
}

impl From<ScopeEnd> for Error {
    fn from(end: ScopeEnd) -> Self {
        match end {
            ScopeEnd::Cancelled => Error::Cancelled,
            ScopeEnd::DeadlineExceeded => Error::DeadlineExceeded,
        }
    }
}

/// A caller-controlled handle that bounds and can abort an execution.
#[derive(Debug, Clone)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::background()
    }
}

impl Scope {
    /// A root scope with no deadline that is only ended by [`Scope::cancel`].
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A child that can be cancelled on its own without affecting `self`.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// A child that also ends `timeout` from now.
    ///
    /// A timeout too large to represent as an instant adds no deadline; the
    /// child keeps the parent's, if any.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.with_cancel(),
        }
    }

    /// A child that also ends at `deadline`, or at the parent's deadline if
    /// that is earlier.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) => parent.min(deadline),
            None => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// End this scope and every scope derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The reason this scope has already ended, if it has.
    pub fn end(&self) -> Option<ScopeEnd> {
        if self.token.is_cancelled() {
            return Some(ScopeEnd::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(ScopeEnd::DeadlineExceeded),
            _ => None,
        }
    }

    /// `Err` if the scope has already ended.
    pub fn check(&self) -> Result<(), Error> {
        match self.end() {
            Some(end) => Err(end.into()),
            None => Ok(()),
        }
    }

    /// Resolves once the scope is cancelled or its deadline passes.
    pub async fn done(&self) -> ScopeEnd {
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                () = self.token.cancelled() => ScopeEnd::Cancelled,
                () = tokio::time::sleep_until(deadline) => ScopeEnd::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                ScopeEnd::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_open() {
        let scope = Scope::background();
        assert!(!scope.is_cancelled());
        assert!(scope.deadline().is_none());
        assert!(scope.remaining().is_none());
        assert!(scope.end().is_none());
        assert!(scope.check().is_ok());
    }

    #[test]
    fn cancel_propagates_to_children_only() {
        let parent = Scope::background();
        let child = parent.with_cancel();
        let grandchild = child.with_timeout(Duration::from_secs(60));

        child.cancel();
        assert!(child.is_cancelled());
        assert!(grandchild.is_cancelled());
        assert!(!parent.is_cancelled());
        assert!(matches!(grandchild.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn child_deadline_never_exceeds_parent() {
        let parent = Scope::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.with_timeout(Duration::from_millis(10));
        assert!(tighter.deadline() < parent.deadline());
    }

    #[test]
    fn unrepresentable_timeout_keeps_parent_deadline() {
        let unbounded = Scope::background().with_timeout(Duration::MAX);
        assert!(unbounded.deadline().is_none());
        assert!(unbounded.check().is_ok());

        let parent = Scope::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::MAX);
        assert_eq!(child.deadline(), parent.deadline());

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let scope = Scope::background().with_deadline(Instant::now());
        assert_eq!(scope.end(), Some(ScopeEnd::DeadlineExceeded));
        assert!(matches!(scope.check(), Err(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn done_resolves_on_deadline() {
        let scope = Scope::background().with_timeout(Duration::from_millis(20));
        assert_eq!(scope.done().await, ScopeEnd::DeadlineExceeded);
    }

    #[tokio::test]
    async fn done_resolves_on_cancel() {
        let scope = Scope::background().with_timeout(Duration::from_secs(60));
        let canceller = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });
        assert_eq!(scope.done().await, ScopeEnd::Cancelled);
    }
}
