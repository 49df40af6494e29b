//! Authorization Types
//!
//! The consent record a client obtains through a grant flow. Access tokens
//! and authorization codes derived from it live in the store and are
//! destroyed with it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{generate_identifier, HasExpiry};
use crate::error::{ResourceServerError, ValidationError};
use crate::token::{RevocationReport, TokenStore};
use crate::types::{AccessToken, AuthorizationCode, Scope};

/// Client consent grant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// Record identifier.
    pub id: String,
    /// Owning client. Required; checked by [`Authorization::validate`].
    pub client_id: Option<String>,
    /// Granted scope; `None` when nothing was granted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// Expiration time of the consent itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// When the consent was granted.
    pub created_at: DateTime<Utc>,
}

impl Authorization {
    /// Create an authorization for `client_id` with a fresh identifier.
    pub fn new(client_id: impl Into<String>, scope: impl Into<Scope>) -> Self {
        let scope = scope.into();
        Self {
            id: generate_identifier(),
            client_id: Some(client_id.into()),
            scope: (!scope.is_empty()).then_some(scope),
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    /// Set the expiration time.
    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether `scope` is exactly one of the granted scope tokens.
    ///
    /// Never fails; an authorization without scope has none.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.as_ref().is_some_and(|s| s.contains(scope))
    }

    /// Check the record can be persisted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.client_id.as_deref() {
            Some(client_id) if !client_id.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::MissingClient {
                authorization_id: self.id.clone(),
            }),
        }
    }

    /// Access tokens derived from this authorization.
    pub async fn access_tokens<S: TokenStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<AccessToken>, ResourceServerError> {
        Ok(store.access_tokens_for(&self.id).await?)
    }

    /// Authorization codes derived from this authorization.
    pub async fn authorization_codes<S: TokenStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<Vec<AuthorizationCode>, ResourceServerError> {
        Ok(store.authorization_codes_for(&self.id).await?)
    }

    /// Destroy this authorization together with its codes and tokens.
    ///
    /// Codes go first, then tokens, then the authorization. A failing step
    /// aborts the cascade before the authorization is touched; see
    /// [`revoke_authorization`](crate::token::revoke_authorization).
    pub async fn revoke<S: TokenStore + ?Sized>(
        &self,
        store: &S,
    ) -> Result<RevocationReport, ResourceServerError> {
        Ok(store.revoke_authorization(&self.id).await?)
    }
}

impl HasExpiry for Authorization {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn refresh_token(&self) -> Option<&str> {
        None
    }
}
