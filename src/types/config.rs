//! Configuration Types
//!
//! Resource server configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Realm used in challenges when none is configured.
pub const DEFAULT_REALM: &str = "Application";

/// Protected endpoint configuration.
///
/// Every constructor validates, deserialization included, so a loaded
/// configuration always renders well-formed challenges.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawResourceServerConfig")]
pub struct ResourceServerConfig {
    realm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_scope: Option<String>,
}

/// Unvalidated wire form.
#[derive(Deserialize)]
struct RawResourceServerConfig {
    #[serde(default = "default_realm")]
    realm: String,
    #[serde(default)]
    required_scope: Option<String>,
}

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

impl TryFrom<RawResourceServerConfig> for ResourceServerConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawResourceServerConfig) -> Result<Self, Self::Error> {
        Self::new(raw.realm, raw.required_scope)
    }
}

impl ResourceServerConfig {
    /// Create a validated configuration.
    ///
    /// The realm is emitted inside single quotes, so it must be non-empty and
    /// free of quotes, backslashes and control characters. A required scope
    /// is exactly one scope token.
    pub fn new(
        realm: impl Into<String>,
        required_scope: Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let realm = realm.into();
        validate_realm(&realm)?;
        if let Some(scope) = &required_scope {
            validate_scope(scope)?;
        }
        Ok(Self {
            realm,
            required_scope,
        })
    }

    /// Realm reported in `WWW-Authenticate` challenges.
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Scope token the endpoint requires; `None` disables the scope check.
    pub fn required_scope(&self) -> Option<&str> {
        self.required_scope.as_deref()
    }
}

impl Default for ResourceServerConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            required_scope: None,
        }
    }
}

fn validate_realm(realm: &str) -> Result<(), ConfigurationError> {
    if realm.trim().is_empty() {
        return Err(ConfigurationError::InvalidRealm {
            message: "realm must not be empty".to_string(),
        });
    }
    if realm
        .chars()
        .any(|c| c == '\'' || c == '\\' || c.is_control())
    {
        return Err(ConfigurationError::InvalidRealm {
            message: format!(
                "realm {:?} contains a quote, backslash or control character",
                realm
            ),
        });
    }
    Ok(())
}

fn validate_scope(scope: &str) -> Result<(), ConfigurationError> {
    if scope.is_empty() || scope.chars().any(char::is_whitespace) {
        return Err(ConfigurationError::InvalidScope {
            scope: scope.to_string(),
        });
    }
    Ok(())
}
