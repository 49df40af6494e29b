//! Request Authentication
//!
//! Resource-server side of OAuth2: find the token a request carries,
//! validate it against the store and answer failures with RFC 6750 style
//! `WWW-Authenticate` challenges.
//!
//! - **Locator** ([`TokenLocator`]): header or `oauth_token` parameter, never both
//! - **Challenge** ([`AuthFailure`], [`Challenge`]): status and header per failure
//! - **Hook** ([`FailureHook`]): lets a host's own failure handling stand down
//! - **Authenticator** ([`Authenticator`]): the decision procedure

pub mod authenticator;
pub mod challenge;
pub mod hook;
pub mod locator;

pub use authenticator::{evaluate, AuthOutcome, Authenticator};
pub use challenge::{AuthFailure, Challenge, WWW_AUTHENTICATE};
#[cfg(test)]
pub use hook::MockFailureHook;
pub use hook::{failure_hook_fn, FailureHook, FnFailureHook};
pub use locator::{TokenLocation, TokenLocator, TokenSource, OAUTH_SCHEME, TOKEN_PARAM};
