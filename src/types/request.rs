//! Request Types
//!
//! The slice of an inbound request the authenticator looks at.

use http::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;

use crate::types::AccessToken;

/// Inbound request seen by the authenticator.
///
/// Headers are an [`http::HeaderMap`], so names match case-insensitively.
/// Parameters hold the merged query and form-body values.
#[derive(Clone, Debug, Default)]
pub struct ResourceRequest {
    headers: HeaderMap,
    params: HashMap<String, String>,
    access_token: Option<AccessToken>,
}

impl ResourceRequest {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a request from the host's headers.
    pub fn with_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Add a header, replacing any previous value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query or body parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string.
    ///
    /// `None` when the header is missing or its value is not visible ASCII.
    pub fn header_str(&self, name: &HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Parameter value by exact name.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Attach the validated token for downstream handlers.
    pub fn attach_token(&mut self, token: AccessToken) {
        self.access_token = Some(token);
    }

    /// Token attached by a successful authentication.
    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }
}

impl From<HeaderMap> for ResourceRequest {
    fn from(headers: HeaderMap) -> Self {
        Self::with_headers(headers)
    }
}
