//! Authorization Code Types

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

use crate::core::{generate_identifier, generate_token_value, HasExpiry};
use crate::types::Authorization;

/// Authorization code owned by an [`Authorization`].
#[derive(Clone)]
pub struct AuthorizationCode {
    /// Record identifier.
    pub id: String,
    /// Owning authorization.
    pub authorization_id: String,
    /// Code value.
    code: SecretString,
    /// Redirect URI the code was issued for.
    pub redirect_uri: Option<String>,
    /// Expiration time.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthorizationCode {
    /// Create a code for `authorization` with a generated value.
    pub fn new(authorization: &Authorization, redirect_uri: Option<String>) -> Self {
        Self {
            id: generate_identifier(),
            authorization_id: authorization.id.clone(),
            code: SecretString::new(generate_token_value()),
            redirect_uri,
            expires_at: None,
        }
    }

    /// Set the expiration time.
    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Code value.
    pub fn code(&self) -> &str {
        self.code.expose_secret()
    }
}

impl HasExpiry for AuthorizationCode {
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    // Codes are single-use and cannot be refreshed.
    fn refresh_token(&self) -> Option<&str> {
        None
    }
}

impl std::fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCode")
            .field("id", &self.id)
            .field("authorization_id", &self.authorization_id)
            .field("code", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
