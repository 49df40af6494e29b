//! Configuration Builder
//!
//! Fluent builder for resource server configuration.

use crate::error::ResourceServerError;
use crate::types::{ResourceServerConfig, DEFAULT_REALM};

/// Resource server configuration builder.
#[derive(Default)]
pub struct ResourceServerConfigBuilder {
    realm: Option<String>,
    required_scope: Option<String>,
}

impl ResourceServerConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the realm reported in challenges.
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Require a scope token on every request.
    pub fn required_scope(mut self, scope: impl Into<String>) -> Self {
        self.required_scope = Some(scope.into());
        self
    }

    /// Build the resource server configuration.
    pub fn build(self) -> Result<ResourceServerConfig, ResourceServerError> {
        let realm = self.realm.unwrap_or_else(|| DEFAULT_REALM.to_string());
        Ok(ResourceServerConfig::new(realm, self.required_scope)?)
    }
}

/// Create a new resource server configuration builder.
pub fn resource_server_config() -> ResourceServerConfigBuilder {
    ResourceServerConfigBuilder::new()
}
