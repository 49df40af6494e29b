//! Failure Hook
//!
//! Integration seam for hosts that run their own authentication-failure
//! handling. The authenticator calls the hook on every rejected request so
//! the host can stand down and let the OAuth challenge through unchanged.

use crate::auth::AuthFailure;

/// Notified on every non-success outcome.
#[cfg_attr(test, mockall::automock)]
pub trait FailureHook: Send + Sync {
    /// Called once per rejected request, before the challenge is returned.
    fn on_failure(&self, failure: &AuthFailure);
}

/// Hook backed by a closure.
pub struct FnFailureHook<F>(F);

impl<F> FailureHook for FnFailureHook<F>
where
    F: Fn(&AuthFailure) + Send + Sync,
{
    fn on_failure(&self, failure: &AuthFailure) {
        (self.0)(failure)
    }
}

/// Wrap a closure as a [`FailureHook`].
pub fn failure_hook_fn<F>(f: F) -> FnFailureHook<F>
where
    F: Fn(&AuthFailure) + Send + Sync,
{
    FnFailureHook(f)
}
