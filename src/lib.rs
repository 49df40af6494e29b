//! OAuth2 Resource Server
//!
//! Protects endpoints with OAuth2 bearer tokens issued by an authorization
//! server that shares the same token store.
//!
//! # Features
//!
//! - Token lookup from the `Authorization: OAuth <token>` header or the
//!   `oauth_token` request parameter, rejecting requests that carry both
//! - Expiry classification with refreshable and dead expired tokens
//! - Scope enforcement with `insufficient_scope` challenges
//! - `WWW-Authenticate` challenges with a configurable realm
//! - Authorization revocation that cascades to codes and access tokens
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use http::header::{HeaderValue, AUTHORIZATION};
//! use oauth2_resource_server::{
//!     resource_server_config, Authenticator, InMemoryTokenStore, ResourceRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = resource_server_config()
//!         .realm("Application")
//!         .required_scope("read")
//!         .build()?;
//!
//!     let store = Arc::new(InMemoryTokenStore::new());
//!     let authenticator = Authenticator::new(store, config);
//!
//!     let request = ResourceRequest::new()
//!         .header(AUTHORIZATION, HeaderValue::from_static("OAuth 4n8Yq..."));
//!     let outcome = authenticator.authenticate(&request).await?;
//!     if let Some(challenge) = outcome.challenge() {
//!         println!("{} {}", challenge.status, challenge.www_authenticate);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: authorizations, tokens, codes, scope sets, requests and configuration
//! - `error`: error hierarchy for validation, storage, revocation and configuration
//! - `core`: clock, expiry classification and identifier generation
//! - `token`: token store interface, implementations and revocation cascade
//! - `auth`: token location, challenges, failure hooks and the authenticator
//! - `builders`: fluent builder for configuration
//! - `telemetry`: authentication metrics

pub mod auth;
pub mod builders;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod token;
pub mod types;

// Re-export authenticator
pub use auth::{
    evaluate, failure_hook_fn, AuthFailure, AuthOutcome, Authenticator, Challenge, FailureHook,
    FnFailureHook, TokenLocation, TokenLocator, TokenSource, OAUTH_SCHEME, TOKEN_PARAM,
    WWW_AUTHENTICATE,
};

// Re-export builders
pub use builders::{resource_server_config, ResourceServerConfigBuilder};

// Re-export errors
pub use error::{
    CascadeStage, ConfigurationError, ResourceResult, ResourceServerError, RevocationError,
    StorageError, ValidationError,
};

// Re-export types
pub use types::{
    AccessToken, Authorization, AuthorizationCode, GrantRef, ResourceRequest,
    ResourceServerConfig, Scope, DEFAULT_REALM,
};

// Re-export core components
pub use core::{
    classify, expires_in, generate_identifier, generate_token_value, Clock, ExpiryStatus,
    FixedClock, HasExpiry, SystemClock,
};

// Re-export token management
pub use token::{
    create_in_memory_token_store, create_mock_token_store, revoke_authorization,
    InMemoryTokenStore, MockTokenStore, RevocationReport, StoreOperation, TokenStore,
};

// Re-export telemetry
pub use telemetry::{
    create_in_memory_metrics, no_op_metrics, AuthMetrics, InMemoryMetrics, MetricEntry,
    MetricLabels, NoOpMetrics,
};
