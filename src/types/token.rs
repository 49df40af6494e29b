//! Token Types
//!
//! Bearer access tokens derived from an authorization or access grant.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::core::{generate_identifier, generate_token_value, HasExpiry};
use crate::error::ValidationError;
use crate::types::{Authorization, Scope};

/// Grant a token was issued from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum GrantRef {
    /// Issued from an [`Authorization`].
    Authorization(String),
    /// Issued directly from an access grant.
    AccessGrant(String),
}

impl GrantRef {
    /// Identifier of the grant record.
    pub fn id(&self) -> &str {
        match self {
            Self::Authorization(id) | Self::AccessGrant(id) => id,
        }
    }

    /// Identifier of the owning authorization, if the grant is one.
    pub fn authorization_id(&self) -> Option<&str> {
        match self {
            Self::Authorization(id) => Some(id),
            Self::AccessGrant(_) => None,
        }
    }
}

/// Bearer access token record.
#[derive(Clone)]
pub struct AccessToken {
    /// Record identifier.
    pub id: String,
    /// Token string presented by clients (lookup key).
    value: SecretString,
    /// Scope of this token.
    pub scope: Scope,
    /// Expiration time; `None` means the token never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token; `None` means the token cannot be refreshed.
    refresh_token: Option<SecretString>,
    /// Originating grant.
    pub grant: GrantRef,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token with an explicit value.
    pub fn new(value: impl Into<String>, grant: GrantRef, scope: impl Into<Scope>) -> Self {
        Self {
            id: generate_identifier(),
            value: SecretString::new(value.into()),
            scope: scope.into(),
            expires_at: None,
            refresh_token: None,
            grant,
            created_at: Utc::now(),
        }
    }

    /// Create a token for `authorization`, inheriting its scope.
    pub fn for_authorization(authorization: &Authorization) -> Self {
        Self::new(
            generate_token_value(),
            GrantRef::Authorization(authorization.id.clone()),
            authorization.scope.clone().unwrap_or_default(),
        )
    }

    /// Create a token issued straight from an access grant.
    pub fn for_access_grant(grant_id: impl Into<String>, scope: impl Into<Scope>) -> Self {
        Self::new(
            generate_token_value(),
            GrantRef::AccessGrant(grant_id.into()),
            scope,
        )
    }

    /// Narrow the scope. Fails if `scope` asks for anything the token
    /// does not already carry.
    pub fn with_scope(mut self, scope: impl Into<Scope>) -> Result<Self, ValidationError> {
        let scope = scope.into();
        if let Some(extra) = scope.difference(&self.scope).next() {
            return Err(ValidationError::ScopeNotGranted {
                scope: extra.to_string(),
            });
        }
        self.scope = scope;
        Ok(self)
    }

    /// Set the expiration time.
    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Attach a refresh token.
    pub fn refreshable_with(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(SecretString::new(refresh_token.into()));
        self
    }

    /// Attach a freshly generated refresh token.
    pub fn refreshable(self) -> Self {
        self.refreshable_with(generate_token_value())
    }

    /// Token string (lookup key).
    pub fn value(&self) -> &str {
        self.value.expose_secret()
    }

    /// Replace the expiration time.
    pub fn set_expires_at(&mut self, expires_at: Option<DateTime<Utc>>) {
        self.expires_at = expires_at;
    }

    /// Drop the refresh token.
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token = None;
    }

    /// Whether `scope` is exactly one of this token's scope tokens.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.contains(scope)
    }

    /// Owning authorization, if issued from one.
    pub fn authorization_id(&self) -> Option<&str> {
        self.grant.authorization_id()
    }

    /// Check the record can be persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.value().trim().is_empty() {
            return Err(ValidationError::BlankTokenValue);
        }
        if self
            .refresh_token
            .as_ref()
            .is_some_and(|t| t.expose_secret().trim().is_empty())
        {
            return Err(ValidationError::BlankRefreshToken);
        }
        Ok(())
    }
}

impl HasExpiry for AccessToken {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn refresh_token(&self) -> Option<&str> {
        // A blank refresh token cannot be exchanged.
        self.refresh_token
            .as_ref()
            .map(|t| t.expose_secret().as_str())
            .filter(|t| !t.trim().is_empty())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("id", &self.id)
            .field("value", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("grant", &self.grant)
            .finish()
    }
}
