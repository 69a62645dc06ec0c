//! Provider selection
//!
//! The application picks one identity backend at configuration time. All
//! variants satisfy [`AuthProvider`], so downstream code never branches on
//! the backend.

use std::sync::Arc;

use async_trait::async_trait;
use richchat_common::{Clock, SessionStore};
use richchat_domain::{
    AuthConfig, AuthOutcome, AuthState, LocalUser, ProviderKind, Result, RichChatError,
    ServiceScope,
};
use tracing::info;

use super::mock::MockAuthenticator;
use super::ports::{AuthProvider, SilentFrameHost, UserIdSource};
use super::token_manager::TokenManager;

/// Host collaborators the provider variants draw from
#[derive(Clone)]
pub struct AuthDependencies {
    pub session_store: Arc<dyn SessionStore>,
    pub frames: Arc<dyn SilentFrameHost>,
    pub clock: Arc<dyn Clock>,
    /// Required for the mock provider only
    pub user_ids: Option<Arc<dyn UserIdSource>>,
}

/// Identity provider chosen by configuration
pub enum AuthManager {
    Azure(TokenManager),
    Google(TokenManager),
    Mock(MockAuthenticator),
}

impl AuthManager {
    /// Build the variant named by `config.provider`.
    ///
    /// # Errors
    /// Returns `RichChatError::Config` if the mock provider has no user id
    /// source, or if the token manager rejects the configuration.
    pub fn from_config(config: &AuthConfig, deps: AuthDependencies) -> Result<Self> {
        let manager = match config.provider {
            ProviderKind::Azure => Self::Azure(TokenManager::new(
                config.clone(),
                deps.session_store,
                deps.frames,
                deps.clock,
            )?),
            ProviderKind::Google => Self::Google(TokenManager::new(
                config.clone(),
                deps.session_store,
                deps.frames,
                deps.clock,
            )?),
            ProviderKind::Mock => {
                let user_ids = deps.user_ids.ok_or_else(|| {
                    RichChatError::Config("mock provider requires a user id source".to_string())
                })?;
                Self::Mock(MockAuthenticator::new(user_ids, deps.clock))
            }
        };

        info!(provider = %manager.kind(), "Authentication manager created");
        Ok(manager)
    }

    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        match self {
            Self::Azure(_) => ProviderKind::Azure,
            Self::Google(_) => ProviderKind::Google,
            Self::Mock(_) => ProviderKind::Mock,
        }
    }

    fn provider(&self) -> &dyn AuthProvider {
        match self {
            Self::Azure(tm) | Self::Google(tm) => tm,
            Self::Mock(mock) => mock,
        }
    }
}

#[async_trait]
impl AuthProvider for AuthManager {
    async fn authenticate(&self) -> Result<AuthOutcome> {
        self.provider().authenticate().await
    }

    async fn resume_from_redirect(&self, fragment: &str) -> Result<LocalUser> {
        self.provider().resume_from_redirect(fragment).await
    }

    async fn get_service_token(&self, scope: ServiceScope, force_refresh: bool) -> Result<String> {
        self.provider().get_service_token(scope, force_refresh).await
    }

    fn is_authenticated(&self) -> bool {
        self.provider().is_authenticated()
    }

    fn local_user_info(&self) -> Option<LocalUser> {
        self.provider().local_user_info()
    }

    fn state(&self) -> AuthState {
        self.provider().state()
    }

    fn sign_out(&self) {
        self.provider().sign_out();
    }
}
