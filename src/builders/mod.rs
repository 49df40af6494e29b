//! Builders
//!
//! Fluent builder patterns for resource server configuration.

pub mod config;

pub use config::{resource_server_config, ResourceServerConfigBuilder};
