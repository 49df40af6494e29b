//! Token Store
//!
//! Storage interface for authorizations, access tokens and authorization
//! codes, with an in-memory implementation and a mock for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::RwLock;

use crate::error::{ResourceResult, RevocationError, StorageError};
use crate::token::revocation::{self, RevocationReport};
use crate::types::{AccessToken, Authorization, AuthorizationCode};

/// Token store interface.
///
/// Lookups must be safe under concurrent access. Implementations decide
/// their own locking; callers assume nothing stronger than eventual
/// consistency with the operation that issued a record.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Find an access token by its token string.
    async fn find_access_token(&self, value: &str) -> Result<Option<AccessToken>, StorageError>;

    /// Find an authorization by identifier.
    async fn find_authorization(&self, id: &str) -> Result<Option<Authorization>, StorageError>;

    /// Access tokens owned by an authorization.
    async fn access_tokens_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AccessToken>, StorageError>;

    /// Authorization codes owned by an authorization.
    async fn authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AuthorizationCode>, StorageError>;

    /// Insert or replace an authorization, keyed by identifier.
    async fn insert_authorization(&self, authorization: Authorization)
        -> Result<(), StorageError>;

    /// Insert or replace an access token.
    ///
    /// Fails with [`StorageError::Conflict`] if another record already uses
    /// the same token string.
    async fn insert_access_token(&self, token: AccessToken) -> Result<(), StorageError>;

    /// Insert or replace an authorization code, keyed by identifier.
    async fn insert_authorization_code(&self, code: AuthorizationCode)
        -> Result<(), StorageError>;

    /// Delete one access token by token string.
    async fn delete_access_token(&self, value: &str) -> Result<bool, StorageError>;

    /// Delete every authorization code of an authorization.
    ///
    /// A failed call must delete nothing.
    async fn delete_authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<usize, StorageError>;

    /// Delete every access token of an authorization.
    ///
    /// A failed call must delete nothing.
    async fn delete_access_tokens_for(&self, authorization_id: &str)
        -> Result<usize, StorageError>;

    /// Delete an authorization record only.
    async fn delete_authorization(&self, id: &str) -> Result<bool, StorageError>;

    /// Validate and persist an authorization.
    async fn save_authorization(&self, authorization: Authorization) -> ResourceResult<()> {
        authorization.validate()?;
        Ok(self.insert_authorization(authorization).await?)
    }

    /// Validate and persist an access token.
    async fn save_access_token(&self, token: AccessToken) -> ResourceResult<()> {
        token.validate()?;
        Ok(self.insert_access_token(token).await?)
    }

    /// Persist an authorization code.
    async fn save_authorization_code(&self, code: AuthorizationCode) -> ResourceResult<()> {
        Ok(self.insert_authorization_code(code).await?)
    }

    /// Destroy an authorization with its codes and tokens.
    ///
    /// The default runs the ordered cascade with compensating restore.
    /// Stores with transactions should override this to run it atomically.
    async fn revoke_authorization(&self, id: &str) -> Result<RevocationReport, RevocationError> {
        revocation::revoke_authorization(self, id).await
    }
}

#[derive(Default)]
struct Records {
    authorizations: HashMap<String, Authorization>,
    /// Keyed by token string.
    access_tokens: HashMap<String, AccessToken>,
    /// Keyed by record identifier.
    authorization_codes: HashMap<String, AuthorizationCode>,
}

impl Records {
    fn insert_access_token(&mut self, token: AccessToken) -> Result<(), StorageError> {
        if let Some(existing) = self.access_tokens.get(token.value()) {
            if existing.id != token.id {
                return Err(StorageError::Conflict {
                    key: format!("access_token:{}", token.id),
                });
            }
        }
        // A re-saved record may carry a new value; drop the old key.
        self.access_tokens.retain(|_, t| t.id != token.id);
        self.access_tokens.insert(token.value().to_string(), token);
        Ok(())
    }

    fn tokens_for(&self, authorization_id: &str) -> Vec<AccessToken> {
        self.access_tokens
            .values()
            .filter(|t| t.authorization_id() == Some(authorization_id))
            .cloned()
            .collect()
    }

    fn codes_for(&self, authorization_id: &str) -> Vec<AuthorizationCode> {
        self.authorization_codes
            .values()
            .filter(|c| c.authorization_id == authorization_id)
            .cloned()
            .collect()
    }

    fn delete_tokens_for(&mut self, authorization_id: &str) -> usize {
        let before = self.access_tokens.len();
        self.access_tokens
            .retain(|_, t| t.authorization_id() != Some(authorization_id));
        before - self.access_tokens.len()
    }

    fn delete_codes_for(&mut self, authorization_id: &str) -> usize {
        let before = self.authorization_codes.len();
        self.authorization_codes
            .retain(|_, c| c.authorization_id != authorization_id);
        before - self.authorization_codes.len()
    }
}

/// In-memory token store.
///
/// Reads share a lock; revocation runs under a single write lock, so it is
/// atomic with respect to concurrent lookups.
#[derive(Default)]
pub struct InMemoryTokenStore {
    records: RwLock<Records>,
}

impl InMemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find_access_token(&self, value: &str) -> Result<Option<AccessToken>, StorageError> {
        Ok(self.records.read().await.access_tokens.get(value).cloned())
    }

    async fn find_authorization(&self, id: &str) -> Result<Option<Authorization>, StorageError> {
        Ok(self.records.read().await.authorizations.get(id).cloned())
    }

    async fn access_tokens_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AccessToken>, StorageError> {
        Ok(self.records.read().await.tokens_for(authorization_id))
    }

    async fn authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AuthorizationCode>, StorageError> {
        Ok(self.records.read().await.codes_for(authorization_id))
    }

    async fn insert_authorization(
        &self,
        authorization: Authorization,
    ) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .authorizations
            .insert(authorization.id.clone(), authorization);
        Ok(())
    }

    async fn insert_access_token(&self, token: AccessToken) -> Result<(), StorageError> {
        self.records.write().await.insert_access_token(token)
    }

    async fn insert_authorization_code(
        &self,
        code: AuthorizationCode,
    ) -> Result<(), StorageError> {
        self.records
            .write()
            .await
            .authorization_codes
            .insert(code.id.clone(), code);
        Ok(())
    }

    async fn delete_access_token(&self, value: &str) -> Result<bool, StorageError> {
        Ok(self
            .records
            .write()
            .await
            .access_tokens
            .remove(value)
            .is_some())
    }

    async fn delete_authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<usize, StorageError> {
        Ok(self.records.write().await.delete_codes_for(authorization_id))
    }

    async fn delete_access_tokens_for(
        &self,
        authorization_id: &str,
    ) -> Result<usize, StorageError> {
        Ok(self.records.write().await.delete_tokens_for(authorization_id))
    }

    async fn delete_authorization(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self
            .records
            .write()
            .await
            .authorizations
            .remove(id)
            .is_some())
    }

    async fn revoke_authorization(&self, id: &str) -> Result<RevocationReport, RevocationError> {
        let mut records = self.records.write().await;
        if !records.authorizations.contains_key(id) {
            return Err(RevocationError::NotFound {
                authorization_id: id.to_string(),
            });
        }

        let codes_destroyed = records.delete_codes_for(id);
        let tokens_destroyed = records.delete_tokens_for(id);
        records.authorizations.remove(id);

        tracing::info!(
            authorization_id = %id,
            codes_destroyed,
            tokens_destroyed,
            "Authorization revoked"
        );

        Ok(RevocationReport {
            authorization_id: id.to_string(),
            codes_destroyed,
            tokens_destroyed,
        })
    }
}

/// Store operation, for failure injection and call history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FindAccessToken,
    FindAuthorization,
    ListAccessTokens,
    ListAuthorizationCodes,
    InsertAuthorization,
    InsertAccessToken,
    InsertAuthorizationCode,
    DeleteAccessToken,
    DeleteAuthorizationCodes,
    DeleteAccessTokens,
    DeleteAuthorization,
}

/// Mock token store for testing.
///
/// Uses the default, non-atomic revoke cascade so partial failures can be
/// exercised.
#[derive(Default)]
pub struct MockTokenStore {
    records: Mutex<Records>,
    history: Mutex<Vec<StoreOperation>>,
    failures: Mutex<HashMap<StoreOperation, StorageError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTokenStore {
    /// Create new mock token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `operation` fail with `error` until cleared.
    pub fn fail_on(&self, operation: StoreOperation, error: StorageError) -> &Self {
        lock(&self.failures).insert(operation, error);
        self
    }

    /// Stop failing `operation`.
    pub fn clear_failure(&self, operation: StoreOperation) -> &Self {
        lock(&self.failures).remove(&operation);
        self
    }

    /// Make every operation fail as if the store were down.
    pub fn set_unavailable(&self) -> &Self {
        let mut failures = lock(&self.failures);
        for operation in [
            StoreOperation::FindAccessToken,
            StoreOperation::FindAuthorization,
            StoreOperation::ListAccessTokens,
            StoreOperation::ListAuthorizationCodes,
            StoreOperation::InsertAuthorization,
            StoreOperation::InsertAccessToken,
            StoreOperation::InsertAuthorizationCode,
            StoreOperation::DeleteAccessToken,
            StoreOperation::DeleteAuthorizationCodes,
            StoreOperation::DeleteAccessTokens,
            StoreOperation::DeleteAuthorization,
        ] {
            failures.insert(
                operation,
                StorageError::Unavailable {
                    message: "Mock store unavailable".to_string(),
                },
            );
        }
        self
    }

    /// Operations called so far, in order.
    pub fn get_history(&self) -> Vec<StoreOperation> {
        lock(&self.history).clone()
    }

    /// Number of stored access tokens.
    pub fn access_token_count(&self) -> usize {
        lock(&self.records).access_tokens.len()
    }

    /// Number of stored authorization codes.
    pub fn authorization_code_count(&self) -> usize {
        lock(&self.records).authorization_codes.len()
    }

    fn enter(&self, operation: StoreOperation) -> Result<MutexGuard<'_, Records>, StorageError> {
        lock(&self.history).push(operation);
        if let Some(error) = lock(&self.failures).get(&operation) {
            return Err(error.clone());
        }
        Ok(lock(&self.records))
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn find_access_token(&self, value: &str) -> Result<Option<AccessToken>, StorageError> {
        let records = self.enter(StoreOperation::FindAccessToken)?;
        Ok(records.access_tokens.get(value).cloned())
    }

    async fn find_authorization(&self, id: &str) -> Result<Option<Authorization>, StorageError> {
        let records = self.enter(StoreOperation::FindAuthorization)?;
        Ok(records.authorizations.get(id).cloned())
    }

    async fn access_tokens_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AccessToken>, StorageError> {
        let records = self.enter(StoreOperation::ListAccessTokens)?;
        Ok(records.tokens_for(authorization_id))
    }

    async fn authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<Vec<AuthorizationCode>, StorageError> {
        let records = self.enter(StoreOperation::ListAuthorizationCodes)?;
        Ok(records.codes_for(authorization_id))
    }

    async fn insert_authorization(
        &self,
        authorization: Authorization,
    ) -> Result<(), StorageError> {
        let mut records = self.enter(StoreOperation::InsertAuthorization)?;
        records
            .authorizations
            .insert(authorization.id.clone(), authorization);
        Ok(())
    }

    async fn insert_access_token(&self, token: AccessToken) -> Result<(), StorageError> {
        let mut records = self.enter(StoreOperation::InsertAccessToken)?;
        records.insert_access_token(token)
    }

    async fn insert_authorization_code(
        &self,
        code: AuthorizationCode,
    ) -> Result<(), StorageError> {
        let mut records = self.enter(StoreOperation::InsertAuthorizationCode)?;
        records.authorization_codes.insert(code.id.clone(), code);
        Ok(())
    }

    async fn delete_access_token(&self, value: &str) -> Result<bool, StorageError> {
        let mut records = self.enter(StoreOperation::DeleteAccessToken)?;
        Ok(records.access_tokens.remove(value).is_some())
    }

    async fn delete_authorization_codes_for(
        &self,
        authorization_id: &str,
    ) -> Result<usize, StorageError> {
        let mut records = self.enter(StoreOperation::DeleteAuthorizationCodes)?;
        Ok(records.delete_codes_for(authorization_id))
    }

    async fn delete_access_tokens_for(
        &self,
        authorization_id: &str,
    ) -> Result<usize, StorageError> {
        let mut records = self.enter(StoreOperation::DeleteAccessTokens)?;
        Ok(records.delete_tokens_for(authorization_id))
    }

    async fn delete_authorization(&self, id: &str) -> Result<bool, StorageError> {
        let mut records = self.enter(StoreOperation::DeleteAuthorization)?;
        Ok(records.authorizations.remove(id).is_some())
    }
}

/// Create in-memory token store.
pub fn create_in_memory_token_store() -> InMemoryTokenStore {
    InMemoryTokenStore::new()
}

/// Create mock token store for testing.
pub fn create_mock_token_store() -> MockTokenStore {
    MockTokenStore::new()
}
