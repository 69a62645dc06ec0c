//! Identity provider for environments without an OAuth server
//!
//! The user id comes from the host (typically a prompt); service tokens are
//! unsigned JWTs the messaging backend accepts in sandbox mode.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use richchat_common::auth as codec;
use richchat_common::Clock;
use richchat_domain::constants::{MOCK_TOKEN_LIFETIME_SECS, MOCK_TOKEN_SKEW_SECS};
use richchat_domain::{AuthOutcome, AuthState, LocalUser, Result, RichChatError, ServiceScope};
use serde_json::{json, Map};
use tracing::{debug, info};

use super::ports::{AuthProvider, UserIdSource};

/// User id source that always answers with the same id
#[derive(Debug, Clone)]
pub struct FixedUserId(pub String);

#[async_trait]
impl UserIdSource for FixedUserId {
    async fn user_id(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Authenticator minting unsigned tokens for a host-supplied user id
pub struct MockAuthenticator {
    user_ids: Arc<dyn UserIdSource>,
    clock: Arc<dyn Clock>,
    local_user: RwLock<Option<LocalUser>>,
}

impl MockAuthenticator {
    #[must_use]
    pub fn new(user_ids: Arc<dyn UserIdSource>, clock: Arc<dyn Clock>) -> Self {
        Self { user_ids, clock, local_user: RwLock::new(None) }
    }

    fn mint_token(&self, subject: &str) -> Result<String> {
        let now = self.clock.now_secs();
        let mut claims = Map::new();
        claims.insert("jti".to_string(), json!(codec::generate_token_id()));
        claims.insert("sub".to_string(), json!(subject));
        claims.insert("iat".to_string(), json!(now - MOCK_TOKEN_SKEW_SECS));
        claims.insert("exp".to_string(), json!(now + MOCK_TOKEN_LIFETIME_SECS));
        codec::unsigned_token(&claims).map_err(|e| RichChatError::Internal(e.to_string()))
    }
}

#[async_trait]
impl AuthProvider for MockAuthenticator {
    async fn authenticate(&self) -> Result<AuthOutcome> {
        let user_id = self.user_ids.user_id().await?;
        if user_id.trim().is_empty() {
            return Err(RichChatError::InvalidInput("user id must not be empty".to_string()));
        }

        let user = LocalUser {
            user_id: user_id.clone(),
            display_name: Some(user_id.clone()),
            email: Some(user_id),
            ..LocalUser::default()
        };
        *self.local_user.write() = Some(user.clone());
        info!(user_id = %user.user_id, "Authenticated with mock identity");
        Ok(AuthOutcome::Authenticated(user))
    }

    async fn get_service_token(&self, scope: ServiceScope, _force_refresh: bool) -> Result<String> {
        let subject = self
            .local_user
            .read()
            .as_ref()
            .map(|user| user.user_id.clone())
            .ok_or(RichChatError::NotAuthenticated)?;
        debug!(%scope, "Minting unsigned token");
        self.mint_token(&subject)
    }

    fn is_authenticated(&self) -> bool {
        self.local_user.read().is_some()
    }

    fn local_user_info(&self) -> Option<LocalUser> {
        self.local_user.read().clone()
    }

    fn state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    fn sign_out(&self) {
        *self.local_user.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use richchat_common::testing::MockClock;

    use super::*;

    fn authenticator(clock: MockClock) -> MockAuthenticator {
        MockAuthenticator::new(Arc::new(FixedUserId("alice".into())), Arc::new(clock))
    }

    #[tokio::test]
    async fn token_requires_authentication() {
        let auth = authenticator(MockClock::new());
        assert_eq!(
            auth.get_service_token(ServiceScope::Messaging, false).await,
            Err(RichChatError::NotAuthenticated)
        );
        assert_eq!(auth.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn minted_token_carries_subject_and_lifetime() {
        let clock = MockClock::at(1_700_000_000_000);
        let auth = authenticator(clock);

        let outcome = auth.authenticate().await.unwrap();
        assert_eq!(outcome.local_user().map(|u| u.user_id.as_str()), Some("alice"));

        let token = auth.get_service_token(ServiceScope::Directory, false).await.unwrap();
        let payload = codec::decode_payload(&token).unwrap();
        assert_eq!(payload["sub"], "alice");
        assert_eq!(payload["iat"], 1_700_000_000 - 60);
        assert_eq!(payload["exp"], 1_700_000_000 + 86_400);
        assert_eq!(payload["jti"].as_str().map(str::len), Some(18));
    }

    #[tokio::test]
    async fn sign_out_forgets_user() {
        let auth = authenticator(MockClock::new());
        auth.authenticate().await.unwrap();
        assert!(auth.is_authenticated());

        auth.sign_out();
        assert!(auth.local_user_info().is_none());
        assert!(auth.resume_from_redirect("#id_token=x").await.is_err());
    }
}
