//! Resource Server Error Types
//!
//! Error hierarchy for validation, storage, revocation and configuration.
//!
//! Rejected requests (missing, conflicting, invalid or expired tokens) are not
//! errors: they are reported as [`AuthOutcome::Rejected`](crate::auth::AuthOutcome).
//! The types here cover failures the caller has to handle itself.

use std::fmt;
use thiserror::Error;

/// Root error type for the resource server core.
#[derive(Error, Debug)]
pub enum ResourceServerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Revocation error: {0}")]
    Revocation(#[from] RevocationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl ResourceServerError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "RESOURCE_VALIDATION",
            Self::Storage(_) => "RESOURCE_STORAGE",
            Self::Revocation(_) => "RESOURCE_REVOCATION",
            Self::Configuration(_) => "RESOURCE_CONFIG",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_retryable(),
            Self::Revocation(e) => e.storage_error().is_some_and(StorageError::is_retryable),
            _ => false,
        }
    }

    /// HTTP status a host should answer with when this error escapes a request.
    ///
    /// Store outages map to 503 so they are never mistaken for an
    /// authentication failure.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Storage(StorageError::Unavailable { .. }) => 503,
            Self::Revocation(e)
                if matches!(e.storage_error(), Some(StorageError::Unavailable { .. })) =>
            {
                503
            }
            Self::Revocation(RevocationError::NotFound { .. }) => 404,
            Self::Validation(_) => 422,
            _ => 500,
        }
    }
}

/// Record validation error, raised before any store mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Authorization {authorization_id} has no client")]
    MissingClient { authorization_id: String },

    #[error("Token value must not be blank")]
    BlankTokenValue,

    #[error("Refresh token must not be blank")]
    BlankRefreshToken,

    #[error("Scope not granted by the authorization: {scope}")]
    ScopeNotGranted { scope: String },
}

/// Token store error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Delete failed: {message}")]
    DeleteFailed { message: String },

    #[error("Record already exists: {key}")]
    Conflict { key: String },
}

impl StorageError {
    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Conflict { .. })
    }
}

/// Step of the revoke cascade that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStage {
    /// Destroying the authorization codes.
    AuthorizationCodes,
    /// Destroying the access tokens.
    AccessTokens,
    /// Destroying the authorization itself.
    Authorization,
}

impl CascadeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCodes => "authorization_codes",
            Self::AccessTokens => "access_tokens",
            Self::Authorization => "authorization",
        }
    }
}

impl fmt::Display for CascadeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Revocation error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevocationError {
    #[error("Authorization not found: {authorization_id}")]
    NotFound { authorization_id: String },

    /// Reading the authorization or its dependents failed; nothing was deleted.
    #[error("Looking up authorization {authorization_id} failed: {source}")]
    LookupFailed {
        authorization_id: String,
        source: StorageError,
    },

    #[error(
        "Revoking authorization {authorization_id} failed at {stage} (restored: {restored}): {source}"
    )]
    CascadeFailed {
        authorization_id: String,
        stage: CascadeStage,
        /// Whether records deleted by earlier stages were put back.
        restored: bool,
        source: StorageError,
    },
}

impl RevocationError {
    /// Underlying store failure, if any.
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::NotFound { .. } => None,
            Self::LookupFailed { source, .. } | Self::CascadeFailed { source, .. } => Some(source),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid realm: {message}")]
    InvalidRealm { message: String },

    #[error("Invalid required scope: {scope:?}")]
    InvalidScope { scope: String },
}

/// Result type for resource server operations.
pub type ResourceResult<T> = Result<T, ResourceServerError>;
