//! Token Locator
//!
//! Finds the candidate token in a request: the `Authorization: OAuth <token>`
//! header or the `oauth_token` parameter, never both.

use http::header::AUTHORIZATION;

use crate::types::ResourceRequest;

/// Authentication scheme accepted in the header.
pub const OAUTH_SCHEME: &str = "OAuth";

/// Query or body parameter carrying the token.
pub const TOKEN_PARAM: &str = "oauth_token";

/// Where a token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Header,
    Parameter,
}

/// Result of looking for a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLocation {
    /// Exactly one source supplied a token.
    Found { token: String, source: TokenSource },
    /// No source supplied a token.
    Absent,
    /// Both sources supplied a token, whether or not they agree.
    Conflict,
}

/// Extracts the candidate token from a request.
#[derive(Debug, Clone)]
pub struct TokenLocator {
    scheme: String,
    param_name: String,
}

impl Default for TokenLocator {
    fn default() -> Self {
        Self {
            scheme: OAUTH_SCHEME.to_string(),
            param_name: TOKEN_PARAM.to_string(),
        }
    }
}

impl TokenLocator {
    /// Locator for the `OAuth` scheme and the `oauth_token` parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a different header scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Read the token from a different parameter.
    pub fn param_name(mut self, param_name: impl Into<String>) -> Self {
        self.param_name = param_name.into();
        self
    }

    /// Locate the token in `request`.
    pub fn locate(&self, request: &ResourceRequest) -> TokenLocation {
        let from_header = request
            .header_str(&AUTHORIZATION)
            .and_then(|value| self.token_from_header(value));
        let from_param = request.param_value(&self.param_name);

        match (from_header, from_param) {
            (Some(_), Some(_)) => TokenLocation::Conflict,
            (Some(token), None) => TokenLocation::Found {
                token: token.to_string(),
                source: TokenSource::Header,
            },
            (None, Some(token)) => TokenLocation::Found {
                token: token.to_string(),
                source: TokenSource::Parameter,
            },
            (None, None) => TokenLocation::Absent,
        }
    }

    /// Token part of a header value, if it uses the configured scheme.
    ///
    /// Other schemes (`Basic`, `Bearer`, ...) are not a token source, nor is
    /// a value that is not visible ASCII.
    fn token_from_header<'a>(&self, value: &'a str) -> Option<&'a str> {
        let value = value.trim();
        let (scheme, token) = match value.split_once(char::is_whitespace) {
            Some((scheme, token)) => (scheme, token.trim()),
            None => (value, ""),
        };
        scheme.eq_ignore_ascii_case(&self.scheme).then_some(token)
    }
}
