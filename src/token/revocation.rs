//! Authorization Revocation
//!
//! Ordered cascade that destroys an authorization's codes, then its access
//! tokens, then the authorization itself.
//!
//! Stores without transactions get compensating cleanup: the codes and
//! tokens read before the cascade started are written back when a later
//! step fails, so the authorization is never left half-destroyed. Records
//! issued while the cascade runs are not part of the snapshot.

use crate::error::{CascadeStage, RevocationError, StorageError};
use crate::token::TokenStore;
use crate::types::{AccessToken, AuthorizationCode};

/// Outcome of a completed revocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationReport {
    /// Revoked authorization.
    pub authorization_id: String,
    /// Authorization codes destroyed.
    pub codes_destroyed: usize,
    /// Access tokens destroyed.
    pub tokens_destroyed: usize,
}

/// Revoke `authorization_id` through the individual store operations.
pub async fn revoke_authorization<S: TokenStore + ?Sized>(
    store: &S,
    authorization_id: &str,
) -> Result<RevocationReport, RevocationError> {
    let fail = |stage: CascadeStage, restored: bool, source: StorageError| {
        tracing::warn!(
            authorization_id = %authorization_id,
            stage = %stage,
            restored,
            error = %source,
            "Authorization revocation failed"
        );
        RevocationError::CascadeFailed {
            authorization_id: authorization_id.to_string(),
            stage,
            restored,
            source,
        }
    };

    let lookup_failed = |source: StorageError| {
        tracing::warn!(
            authorization_id = %authorization_id,
            error = %source,
            "Authorization lookup failed before revocation"
        );
        RevocationError::LookupFailed {
            authorization_id: authorization_id.to_string(),
            source,
        }
    };

    if store
        .find_authorization(authorization_id)
        .await
        .map_err(lookup_failed)?
        .is_none()
    {
        return Err(RevocationError::NotFound {
            authorization_id: authorization_id.to_string(),
        });
    }

    let codes = store
        .authorization_codes_for(authorization_id)
        .await
        .map_err(lookup_failed)?;
    let tokens = store
        .access_tokens_for(authorization_id)
        .await
        .map_err(lookup_failed)?;

    // A failed bulk delete removes nothing, so only earlier stages are restored.
    let codes_destroyed = store
        .delete_authorization_codes_for(authorization_id)
        .await
        .map_err(|e| fail(CascadeStage::AuthorizationCodes, true, e))?;

    let tokens_destroyed = match store.delete_access_tokens_for(authorization_id).await {
        Ok(count) => count,
        Err(e) => {
            let restored = restore(store, &codes, &[]).await;
            return Err(fail(CascadeStage::AccessTokens, restored, e));
        }
    };

    if let Err(e) = store.delete_authorization(authorization_id).await {
        let restored = restore(store, &codes, &tokens).await;
        return Err(fail(CascadeStage::Authorization, restored, e));
    }

    tracing::info!(
        authorization_id = %authorization_id,
        codes_destroyed,
        tokens_destroyed,
        "Authorization revoked"
    );

    Ok(RevocationReport {
        authorization_id: authorization_id.to_string(),
        codes_destroyed,
        tokens_destroyed,
    })
}

/// Write back snapshotted dependents. Returns whether every write succeeded.
async fn restore<S: TokenStore + ?Sized>(
    store: &S,
    codes: &[AuthorizationCode],
    tokens: &[AccessToken],
) -> bool {
    let mut restored = true;
    for code in codes {
        if let Err(e) = store.insert_authorization_code(code.clone()).await {
            tracing::warn!(code_id = %code.id, error = %e, "Failed to restore authorization code");
            restored = false;
        }
    }
    for token in tokens {
        if let Err(e) = store.insert_access_token(token.clone()).await {
            tracing::warn!(token_id = %token.id, error = %e, "Failed to restore access token");
            restored = false;
        }
    }
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{MockTokenStore, StoreOperation};
    use crate::types::Authorization;

    async fn seeded_store() -> (MockTokenStore, Authorization) {
        let store = MockTokenStore::new();
        let authorization = Authorization::new("client-1", "read write");
        store.save_authorization(authorization.clone()).await.unwrap();
        for _ in 0..2 {
            store
                .save_access_token(AccessToken::for_authorization(&authorization))
                .await
                .unwrap();
            store
                .save_authorization_code(AuthorizationCode::new(&authorization, None))
                .await
                .unwrap();
        }
        (store, authorization)
    }

    fn delete_failed() -> StorageError {
        StorageError::DeleteFailed {
            message: "lock timeout".to_string(),
        }
    }

    #[tokio::test]
    async fn test_cascade_order() {
        let (store, authorization) = seeded_store().await;

        let report = authorization.revoke(&store).await.unwrap();
        assert_eq!(report.codes_destroyed, 2);
        assert_eq!(report.tokens_destroyed, 2);

        let deletes: Vec<StoreOperation> = store
            .get_history()
            .into_iter()
            .filter(|op| {
                matches!(
                    op,
                    StoreOperation::DeleteAuthorizationCodes
                        | StoreOperation::DeleteAccessTokens
                        | StoreOperation::DeleteAuthorization
                )
            })
            .collect();
        assert_eq!(
            deletes,
            vec![
                StoreOperation::DeleteAuthorizationCodes,
                StoreOperation::DeleteAccessTokens,
                StoreOperation::DeleteAuthorization,
            ]
        );

        assert_eq!(store.access_token_count(), 0);
        assert_eq!(store.authorization_code_count(), 0);
        assert!(store
            .find_authorization(&authorization.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_token_delete_failure_restores_codes() {
        let (store, authorization) = seeded_store().await;
        store.fail_on(StoreOperation::DeleteAccessTokens, delete_failed());
        let seeded_ops = store.get_history().len();

        let error = revoke_authorization(&store, &authorization.id)
            .await
            .unwrap_err();
        assert_eq!(
            error,
            RevocationError::CascadeFailed {
                authorization_id: authorization.id.clone(),
                stage: CascadeStage::AccessTokens,
                restored: true,
                source: delete_failed(),
            }
        );

        assert_eq!(store.authorization_code_count(), 2);
        assert_eq!(store.access_token_count(), 2);
        assert!(store
            .find_authorization(&authorization.id)
            .await
            .unwrap()
            .is_some());
        let history = store.get_history();
        assert!(!history.contains(&StoreOperation::DeleteAuthorization));
        assert!(!history[seeded_ops..].contains(&StoreOperation::InsertAccessToken));
    }

    #[tokio::test]
    async fn test_parent_delete_failure_restores_dependents() {
        let (store, authorization) = seeded_store().await;
        store.fail_on(StoreOperation::DeleteAuthorization, delete_failed());

        let error = revoke_authorization(&store, &authorization.id)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            RevocationError::CascadeFailed {
                stage: CascadeStage::Authorization,
                restored: true,
                ..
            }
        ));
        assert_eq!(store.authorization_code_count(), 2);
        assert_eq!(store.access_token_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_restore_is_reported() {
        let (store, authorization) = seeded_store().await;
        store
            .fail_on(StoreOperation::DeleteAccessTokens, delete_failed())
            .fail_on(
                StoreOperation::InsertAuthorizationCode,
                StorageError::WriteFailed {
                    message: "read-only".to_string(),
                },
            );

        let error = revoke_authorization(&store, &authorization.id)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            RevocationError::CascadeFailed {
                stage: CascadeStage::AccessTokens,
                restored: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_deletes_nothing() {
        let (store, authorization) = seeded_store().await;
        let outage = StorageError::Unavailable {
            message: "connection reset".to_string(),
        };
        store.fail_on(StoreOperation::FindAuthorization, outage.clone());

        let error = revoke_authorization(&store, &authorization.id)
            .await
            .unwrap_err();
        assert_eq!(
            error,
            RevocationError::LookupFailed {
                authorization_id: authorization.id.clone(),
                source: outage,
            }
        );
        assert_eq!(
            store.get_history().last(),
            Some(&StoreOperation::FindAuthorization)
        );
        assert_eq!(store.access_token_count(), 2);
    }

    #[tokio::test]
    async fn test_code_delete_failure_writes_nothing_back() {
        let (store, authorization) = seeded_store().await;
        store.set_unavailable();
        store.clear_failure(StoreOperation::FindAuthorization);
        store.clear_failure(StoreOperation::ListAuthorizationCodes);
        store.clear_failure(StoreOperation::ListAccessTokens);

        let error = revoke_authorization(&store, &authorization.id)
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            RevocationError::CascadeFailed {
                stage: CascadeStage::AuthorizationCodes,
                restored: true,
                ..
            }
        ));
        let history = store.get_history();
        assert!(!history.contains(&StoreOperation::InsertAuthorizationCode));
        assert!(!history.contains(&StoreOperation::InsertAccessToken));
        assert_eq!(store.authorization_code_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_authorization() {
        let store = MockTokenStore::new();
        let error = revoke_authorization(&store, "nope").await.unwrap_err();
        assert_eq!(
            error,
            RevocationError::NotFound {
                authorization_id: "nope".to_string()
            }
        );
    }
}
