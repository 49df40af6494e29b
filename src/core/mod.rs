//! Core Infrastructure
//!
//! Building blocks shared by the token model and the authenticator:
//!
//! - **Clock**: injectable source of the current time
//! - **Expiry**: expiry classification for any record with an expiry timestamp
//! - **Identifier**: random opaque identifiers

pub mod clock;
pub mod expiry;
pub mod identifier;

pub use clock::{Clock, FixedClock, SystemClock};
pub use expiry::{classify, expires_in, ExpiryStatus, HasExpiry};
pub use identifier::{generate_identifier, generate_token_value};
