//! Cooperative cancellation.
//!
//! Long tree walks (workspace-wide export collection, document-wide linking)
//! check a [`CancelToken`] at iteration boundaries and abort by returning
//! [`Cancelled`]. Cancellation is a control signal, not an error: callers
//! must propagate it unchanged and never fold it into a linking failure.

use tokio_util::sync::CancellationToken;

/// Distinguished signal that an operation was cancelled mid-walk.
///
/// Deliberately not a `LinkError`: a cancelled pass leaves the model in
/// whatever partially-linked state it reached, and readers treat unresolved
/// references as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Cancellation handle threaded through long traversals.
///
/// Wraps [`CancellationToken`] so checks stay one-liners at loop boundaries:
///
/// ```ignore
/// for doc in documents {
///     cancel.check()?;
///     collect_exports(doc);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: CancellationToken,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that can never fire. Used by callers that have no
    /// cancellation source (tests, one-shot batch runs).
    pub fn never() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Check for a pending cancellation request.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.inner.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// The underlying token, for callers racing external requests.
    pub fn token(&self) -> &CancellationToken {
        &self.inner
    }
}
