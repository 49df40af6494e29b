//! Scope Types
//!
//! Space-delimited OAuth2 scope sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of scope tokens parsed from a space-delimited string.
///
/// Membership is exact-token: `"read"` does not satisfy `"readonly"`.
/// Order of first appearance is preserved so the set renders back the way it
/// was granted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Scope {
    tokens: Vec<String>,
}

impl Scope {
    /// Parse a space-delimited scope string. Repeated tokens are kept once.
    pub fn parse(scope: &str) -> Self {
        let mut tokens: Vec<String> = Vec::new();
        for token in scope.split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_string());
            }
        }
        Self { tokens }
    }

    /// Build from individual tokens.
    pub fn from_tokens(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let joined: Vec<String> = tokens.into_iter().map(Into::into).collect();
        Self::parse(&joined.join(" "))
    }

    /// Whether `token` is one of the scope tokens.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Whether every token of `self` is also in `other`.
    pub fn is_subset_of(&self, other: &Scope) -> bool {
        self.tokens.iter().all(|t| other.contains(t))
    }

    /// Tokens of `self` missing from `other`.
    pub fn difference<'a>(&'a self, other: &'a Scope) -> impl Iterator<Item = &'a str> + 'a {
        self.tokens
            .iter()
            .filter(move |t| !other.contains(t))
            .map(String::as_str)
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

impl From<&str> for Scope {
    fn from(scope: &str) -> Self {
        Self::parse(scope)
    }
}

impl From<String> for Scope {
    fn from(scope: String) -> Self {
        Self::parse(&scope)
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.to_string()
    }
}
