//! Authenticator
//!
//! Request-facing decision procedure: locate the token, look it up, classify
//! its expiry, check scope and pick exactly one outcome.
//!
//! Evaluation order, first match wins:
//!
//! 1. token in both header and parameter: 400 `invalid_request`
//! 2. no token: 401, bare challenge
//! 3. unknown token: 401 `invalid_token`
//! 4. expired, no refresh token: 401 `invalid_token`
//! 5. expired with refresh token: 401 `expired_token`
//! 6. required scope missing: 403 `insufficient_scope`
//! 7. success
//!
//! Expiry is always decided before scope: an expired token reports expiry
//! even when its scope is also insufficient.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::auth::{AuthFailure, Challenge, FailureHook, TokenLocation, TokenLocator};
use crate::core::{classify, Clock, ExpiryStatus, SystemClock};
use crate::error::ResourceResult;
use crate::telemetry::{AuthMetrics, NoOpMetrics};
use crate::token::TokenStore;
use crate::types::{AccessToken, ResourceRequest, ResourceServerConfig};

/// Outcome of authenticating one request.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// The token is valid for this endpoint.
    Authenticated(AccessToken),
    /// The request must be answered with the challenge.
    Rejected {
        failure: AuthFailure,
        challenge: Challenge,
    },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Validated token, on success.
    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::Authenticated(token) => Some(token),
            Self::Rejected { .. } => None,
        }
    }

    /// Failure, on rejection.
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            Self::Authenticated(_) => None,
            Self::Rejected { failure, .. } => Some(failure),
        }
    }

    /// Challenge to send, on rejection.
    pub fn challenge(&self) -> Option<&Challenge> {
        match self {
            Self::Authenticated(_) => None,
            Self::Rejected { challenge, .. } => Some(challenge),
        }
    }
}

/// Decide the outcome for a located token and its lookup result.
///
/// Pure: `now` comes from the caller's clock and `token` from the store.
/// Returns the token when it is valid for the endpoint.
pub fn evaluate<'a>(
    location: &TokenLocation,
    token: Option<&'a AccessToken>,
    now: DateTime<Utc>,
    required_scope: Option<&str>,
) -> Result<&'a AccessToken, AuthFailure> {
    match location {
        TokenLocation::Conflict => return Err(AuthFailure::ConflictingTokens),
        TokenLocation::Absent => return Err(AuthFailure::MissingToken),
        TokenLocation::Found { .. } => {}
    }

    let token = token.ok_or(AuthFailure::UnknownToken)?;

    match classify(token, now) {
        ExpiryStatus::ExpiredDead => return Err(AuthFailure::ExpiredToken),
        ExpiryStatus::ExpiredRefreshable => return Err(AuthFailure::RefreshableToken),
        ExpiryStatus::Active => {}
    }

    if let Some(required) = required_scope {
        if !token.has_scope(required) {
            return Err(AuthFailure::InsufficientScope {
                required: required.to_string(),
            });
        }
    }

    Ok(token)
}

/// Authenticates requests for one protected endpoint.
///
/// Holds no per-request state; one instance can serve concurrent requests.
pub struct Authenticator<S: TokenStore + ?Sized> {
    store: Arc<S>,
    config: ResourceServerConfig,
    locator: TokenLocator,
    clock: Arc<dyn Clock>,
    failure_hook: Option<Arc<dyn FailureHook>>,
    metrics: Arc<dyn AuthMetrics>,
}

impl<S: TokenStore + ?Sized> Clone for Authenticator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            config: self.config.clone(),
            locator: self.locator.clone(),
            clock: self.clock.clone(),
            failure_hook: self.failure_hook.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: TokenStore + ?Sized> Authenticator<S> {
    /// Create an authenticator backed by `store`.
    pub fn new(store: Arc<S>, config: ResourceServerConfig) -> Self {
        Self {
            store,
            config,
            locator: TokenLocator::new(),
            clock: Arc::new(SystemClock),
            failure_hook: None,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Use a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Notify `hook` on every rejected request.
    pub fn with_failure_hook(mut self, hook: Arc<dyn FailureHook>) -> Self {
        self.failure_hook = Some(hook);
        self
    }

    /// Record outcomes in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn AuthMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Use a different token locator.
    pub fn with_locator(mut self, locator: TokenLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Endpoint configuration.
    pub fn config(&self) -> &ResourceServerConfig {
        &self.config
    }

    /// Authenticate `request`.
    ///
    /// Rejections are `Ok(AuthOutcome::Rejected)`. `Err` means the store
    /// could not be read and the request should fail with a server error.
    pub async fn authenticate(&self, request: &ResourceRequest) -> ResourceResult<AuthOutcome> {
        let location = self.locator.locate(request);

        let token = match &location {
            TokenLocation::Found { token, .. } => {
                match self.store.find_access_token(token).await {
                    Ok(found) => found,
                    Err(e) => {
                        tracing::warn!(error = %e, "Access token lookup failed");
                        self.metrics.record_store_error("find_access_token");
                        return Err(e.into());
                    }
                }
            }
            TokenLocation::Absent | TokenLocation::Conflict => None,
        };

        let now = self.clock.now();
        match evaluate(
            &location,
            token.as_ref(),
            now,
            self.config.required_scope(),
        ) {
            Ok(token) => {
                tracing::debug!(outcome = "authenticated", "Request authenticated");
                self.metrics.record_authentication("authenticated", None);
                Ok(AuthOutcome::Authenticated(token.clone()))
            }
            Err(failure) => Ok(self.reject(failure)),
        }
    }

    /// Authenticate `request` and attach the token to it on success.
    pub async fn authenticate_request(
        &self,
        request: &mut ResourceRequest,
    ) -> ResourceResult<AuthOutcome> {
        let outcome = self.authenticate(request).await?;
        if let AuthOutcome::Authenticated(token) = &outcome {
            request.attach_token(token.clone());
        }
        Ok(outcome)
    }

    fn reject(&self, failure: AuthFailure) -> AuthOutcome {
        let challenge = failure.challenge(self.config.realm());
        tracing::debug!(
            outcome = failure.label(),
            status = challenge.status,
            "Request rejected"
        );
        self.metrics
            .record_authentication(failure.label(), Some(challenge.status));
        if let Some(hook) = &self.failure_hook {
            hook.on_failure(&failure);
        }
        AuthOutcome::Rejected { failure, challenge }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MockFailureHook;
    use crate::core::FixedClock;
    use crate::error::{ResourceServerError, StorageError};
    use crate::telemetry::InMemoryMetrics;
    use crate::token::{MockTokenStore, StoreOperation};
    use crate::types::{Authorization, GrantRef};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    fn found() -> TokenLocation {
        TokenLocation::Found {
            token: "t".to_string(),
            source: crate::auth::TokenSource::Parameter,
        }
    }

    fn token(scope: &str) -> AccessToken {
        AccessToken::new("t", GrantRef::AccessGrant("g".to_string()), scope)
    }

    #[test]
    fn test_evaluate_order_conflict_first() {
        let token = token("read");
        let result = evaluate(&TokenLocation::Conflict, Some(&token), now(), None);
        assert_eq!(result.unwrap_err(), AuthFailure::ConflictingTokens);
    }

    #[test]
    fn test_evaluate_absent_and_unknown() {
        assert_eq!(
            evaluate(&TokenLocation::Absent, None, now(), None).unwrap_err(),
            AuthFailure::MissingToken
        );
        assert_eq!(
            evaluate(&found(), None, now(), None).unwrap_err(),
            AuthFailure::UnknownToken
        );
    }

    #[test]
    fn test_expiry_takes_precedence_over_scope() {
        let expired = token("reader").expiring_at(now() - Duration::days(1));
        assert_eq!(
            evaluate(&found(), Some(&expired), now(), Some("editor")).unwrap_err(),
            AuthFailure::ExpiredToken
        );

        let refreshable = expired.refreshable();
        assert_eq!(
            evaluate(&found(), Some(&refreshable), now(), Some("editor")).unwrap_err(),
            AuthFailure::RefreshableToken
        );
    }

    #[test]
    fn test_expiry_boundary_is_expired() {
        let at_now = token("read").expiring_at(now());
        assert_eq!(
            evaluate(&found(), Some(&at_now), now(), None).unwrap_err(),
            AuthFailure::ExpiredToken
        );
    }

    #[test]
    fn test_scope_check() {
        let token = token("reader editor admin");
        assert!(evaluate(&found(), Some(&token), now(), Some("editor")).is_ok());
        assert_eq!(
            evaluate(&found(), Some(&token), now(), Some("edit")).unwrap_err(),
            AuthFailure::InsufficientScope {
                required: "edit".to_string()
            }
        );
        assert!(evaluate(&found(), Some(&token), now(), None).is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_invalid_token() {
        let store = Arc::new(MockTokenStore::new());
        store.fail_on(
            StoreOperation::FindAccessToken,
            StorageError::Unavailable {
                message: "down".to_string(),
            },
        );
        let metrics = Arc::new(InMemoryMetrics::new());
        let mut hook = MockFailureHook::new();
        hook.expect_on_failure().never();

        let authenticator = Authenticator::new(store, ResourceServerConfig::default())
            .with_metrics(metrics.clone())
            .with_failure_hook(Arc::new(hook));

        let request = ResourceRequest::new().param("oauth_token", "abc");
        let error = authenticator.authenticate(&request).await.unwrap_err();
        assert!(matches!(
            error,
            ResourceServerError::Storage(StorageError::Unavailable { .. })
        ));
        assert_eq!(error.http_status(), 503);
        assert_eq!(
            metrics
                .get_entries_by_name("oauth_store_errors_total")
                .len(),
            1
        );
        assert!(metrics
            .get_entries_by_name("oauth_authentications_total")
            .is_empty());
    }

    #[tokio::test]
    async fn test_absent_token_skips_store() {
        let store = Arc::new(MockTokenStore::new());
        let authenticator = Authenticator::new(store.clone(), ResourceServerConfig::default());

        let outcome = authenticator
            .authenticate(&ResourceRequest::new())
            .await
            .unwrap();
        assert_eq!(outcome.failure(), Some(&AuthFailure::MissingToken));
        assert!(store.get_history().is_empty());
    }

    #[tokio::test]
    async fn test_hook_called_once_per_failure() {
        let store = Arc::new(MockTokenStore::new());
        let mut hook = MockFailureHook::new();
        hook.expect_on_failure()
            .withf(|failure| *failure == AuthFailure::UnknownToken)
            .times(1)
            .return_const(());

        let authenticator = Authenticator::new(store, ResourceServerConfig::default())
            .with_failure_hook(Arc::new(hook));

        let request = ResourceRequest::new().param("oauth_token", "invalid-token");
        let outcome = authenticator.authenticate(&request).await.unwrap();
        assert_eq!(outcome.challenge().map(|c| c.status), Some(401));
    }

    #[tokio::test]
    async fn test_success_attaches_token_and_skips_hook() {
        let store = Arc::new(MockTokenStore::new());
        let authorization = Authorization::new("client-1", "read write");
        let token = AccessToken::for_authorization(&authorization)
            .expiring_at(now() + Duration::hours(1));
        let value = token.value().to_string();
        store.save_access_token(token).await.unwrap();

        let mut hook = MockFailureHook::new();
        hook.expect_on_failure().never();
        let metrics = Arc::new(InMemoryMetrics::new());

        let authenticator = Authenticator::new(store, ResourceServerConfig::default())
            .with_clock(Arc::new(FixedClock::new(now())))
            .with_failure_hook(Arc::new(hook))
            .with_metrics(metrics.clone());

        let mut request = ResourceRequest::new().header(
            http::header::AUTHORIZATION,
            http::HeaderValue::from_str(&format!("OAuth {}", value)).unwrap(),
        );
        let outcome = authenticator.authenticate_request(&mut request).await.unwrap();

        assert!(outcome.is_authenticated());
        assert!(outcome.challenge().is_none());
        assert_eq!(
            request.access_token().map(|t| t.scope.to_string()),
            Some("read write".to_string())
        );
        let entries = metrics.get_entries_by_name("oauth_authentications_total");
        assert_eq!(entries[0].labels["outcome"], "authenticated");
        assert!(!entries[0].labels.contains_key("status"));
    }

    #[tokio::test]
    async fn test_clock_drives_expiry() {
        let store = Arc::new(MockTokenStore::new());
        let token = token("read").expiring_at(now() + Duration::minutes(5));
        store.save_access_token(token).await.unwrap();

        let clock = Arc::new(FixedClock::new(now()));
        let authenticator = Authenticator::new(store, ResourceServerConfig::default())
            .with_clock(clock.clone());
        let request = ResourceRequest::new().param("oauth_token", "t");

        assert!(authenticator
            .authenticate(&request)
            .await
            .unwrap()
            .is_authenticated());

        clock.advance(Duration::minutes(5));
        let outcome = authenticator.authenticate(&request).await.unwrap();
        assert_eq!(outcome.failure(), Some(&AuthFailure::ExpiredToken));
    }
}
