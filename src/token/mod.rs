//! Token Management
//!
//! Persistence and lifecycle of authorizations and the tokens derived from
//! them.
//!
//! - **Token Store**: storage interface with in-memory and mock implementations
//! - **Revocation**: ordered revoke cascade with compensating restore

pub mod revocation;
pub mod store;

// Token Store
pub use store::{
    create_in_memory_token_store, create_mock_token_store, InMemoryTokenStore, MockTokenStore,
    StoreOperation, TokenStore,
};

// Revocation
pub use revocation::{revoke_authorization, RevocationReport};
