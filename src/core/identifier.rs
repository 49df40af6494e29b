//! Identifier Generation
//!
//! Random, URL-safe opaque strings for record identifiers and token values.

use base64::Engine;
use rand::Rng;

/// Generate a record identifier (16 random bytes, base64url).
pub fn generate_identifier() -> String {
    random_string(16)
}

/// Generate an opaque token value (32 random bytes, base64url).
pub fn generate_token_value() -> String {
    random_string(32)
}

fn random_string(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(&mut bytes[..]);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes)
}
