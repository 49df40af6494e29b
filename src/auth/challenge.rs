//! Authentication failures and `WWW-Authenticate` challenges.
//!
//! Each failure maps to one HTTP status and one challenge string of the form
//! `OAuth realm='<realm>'[, error='<code>']`.

use http::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use serde_json::json;
use thiserror::Error;

/// Header the challenge is sent in.
pub use http::header::WWW_AUTHENTICATE;

/// Why a request was not authenticated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Token supplied in both the header and the parameter.
    /// Returns HTTP 400 with `error='invalid_request'`.
    #[error("token supplied in both the Authorization header and the request parameters")]
    ConflictingTokens,

    /// No token supplied.
    /// Returns HTTP 401 with a bare challenge.
    #[error("missing access token")]
    MissingToken,

    /// Token does not match any stored access token.
    /// Returns HTTP 401 with `error='invalid_token'`.
    #[error("unknown access token")]
    UnknownToken,

    /// Token expired and cannot be refreshed.
    /// Returns HTTP 401 with `error='invalid_token'`.
    #[error("access token expired")]
    ExpiredToken,

    /// Token expired but carries a refresh token.
    /// Returns HTTP 401 with `error='expired_token'`.
    #[error("access token expired and can be refreshed")]
    RefreshableToken,

    /// Token lacks the scope the endpoint requires.
    /// Returns HTTP 403 with `error='insufficient_scope'`.
    #[error("insufficient scope: {required} required")]
    InsufficientScope { required: String },
}

impl AuthFailure {
    /// HTTP status for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ConflictingTokens => 400,
            Self::InsufficientScope { .. } => 403,
            _ => 401,
        }
    }

    /// Value of the challenge `error` parameter, if any.
    ///
    /// A request without any credentials gets no error code.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::ConflictingTokens => Some("invalid_request"),
            Self::MissingToken => None,
            Self::UnknownToken | Self::ExpiredToken => Some("invalid_token"),
            Self::RefreshableToken => Some("expired_token"),
            Self::InsufficientScope { .. } => Some("insufficient_scope"),
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConflictingTokens => "conflicting_tokens",
            Self::MissingToken => "missing_token",
            Self::UnknownToken => "unknown_token",
            Self::ExpiredToken => "expired_token",
            Self::RefreshableToken => "refreshable_token",
            Self::InsufficientScope { .. } => "insufficient_scope",
        }
    }

    /// Builds the `WWW-Authenticate` header value.
    pub fn www_authenticate(&self, realm: &str) -> String {
        match self.error_code() {
            Some(code) => format!("OAuth realm='{}', error='{}'", realm, code),
            None => format!("OAuth realm='{}'", realm),
        }
    }

    /// Full challenge for this failure.
    pub fn challenge(&self, realm: &str) -> Challenge {
        let body = match self.error_code() {
            Some(code) => json!({
                "error": code,
                "error_description": self.to_string(),
            }),
            None => json!({ "error_description": self.to_string() }),
        };

        Challenge {
            status: self.status_code(),
            www_authenticate: self.www_authenticate(realm),
            body,
        }
    }
}

/// Response a host sends for a rejected request.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// HTTP status.
    pub status: u16,
    /// `WWW-Authenticate` header value.
    pub www_authenticate: String,
    /// Optional JSON body.
    pub body: serde_json::Value,
}

impl Challenge {
    /// `WWW-Authenticate` value as an HTTP header value.
    ///
    /// Fails only for a realm that could not be configured through
    /// [`ResourceServerConfig`](crate::types::ResourceServerConfig).
    pub fn header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.www_authenticate)
    }

    /// Response headers carrying the challenge.
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(WWW_AUTHENTICATE, self.header_value()?);
        Ok(headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REALM: &str = "Application";

    #[test]
    fn test_conflicting_tokens() {
        let failure = AuthFailure::ConflictingTokens;
        assert_eq!(failure.status_code(), 400);
        assert_eq!(
            failure.www_authenticate(REALM),
            "OAuth realm='Application', error='invalid_request'"
        );
    }

    #[test]
    fn test_missing_token_has_bare_challenge() {
        let failure = AuthFailure::MissingToken;
        assert_eq!(failure.status_code(), 401);
        assert_eq!(failure.www_authenticate(REALM), "OAuth realm='Application'");

        let challenge = failure.challenge(REALM);
        assert!(challenge.body.get("error").is_none());
    }

    #[test]
    fn test_invalid_token_variants_share_challenge() {
        for failure in [AuthFailure::UnknownToken, AuthFailure::ExpiredToken] {
            assert_eq!(failure.status_code(), 401);
            assert_eq!(
                failure.www_authenticate(REALM),
                "OAuth realm='Application', error='invalid_token'"
            );
        }
    }

    #[test]
    fn test_refreshable_token() {
        let failure = AuthFailure::RefreshableToken;
        assert_eq!(failure.status_code(), 401);
        assert_eq!(
            failure.www_authenticate(REALM),
            "OAuth realm='Application', error='expired_token'"
        );
    }

    #[test]
    fn test_insufficient_scope() {
        let failure = AuthFailure::InsufficientScope {
            required: "editor".to_string(),
        };
        let challenge = failure.challenge(REALM);
        assert_eq!(challenge.status, 403);
        assert_eq!(
            challenge.www_authenticate,
            "OAuth realm='Application', error='insufficient_scope'"
        );
        assert_eq!(challenge.body["error"], "insufficient_scope");
        assert!(challenge.body["error_description"]
            .as_str()
            .unwrap()
            .contains("editor"));
    }

    #[test]
    fn test_challenge_headers() {
        let headers = AuthFailure::RefreshableToken
            .challenge(REALM)
            .headers()
            .unwrap();
        assert_eq!(
            headers.get(WWW_AUTHENTICATE).unwrap(),
            "OAuth realm='Application', error='expired_token'"
        );
    }

    #[test]
    fn test_custom_realm() {
        assert_eq!(
            AuthFailure::UnknownToken.www_authenticate("Photos"),
            "OAuth realm='Photos', error='invalid_token'"
        );
    }
}
