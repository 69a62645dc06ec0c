//! Token manager for redirect-based OAuth2 identity providers
//!
//! Manages the implicit-flow token lifecycle:
//! - Id-token acquisition through a full-page redirect, guarded by a nonce
//!   whose hash survives the redirect in session storage
//! - Silent access-token refresh in a hidden frame (`prompt=none`)
//! - Per-scope access-token caching with expiry tracking
//!
//! ```text
//! Unauthenticated ──begin──► PendingRedirect ──resume──► Authenticated ◄─┐
//!        ▲                          │                          │          │
//!        │                     resume failed                   ▼          │
//!        │                          ▼                      Refreshing ────┘
//!        │                        Failed                       │
//!        └─────────────────── refresh failed ──────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use richchat_common::auth as codec;
use richchat_common::{Clock, CodecError, SessionStore, StorageError};
use richchat_domain::constants::{
    GOOGLE_CONTACTS_SCOPE, GRAPH_USER_READ_BASIC_ALL_SCOPE, GRAPH_USER_READ_WRITE_SCOPE,
    NONCE_HASH_KEY, REQUIRED_ID_TOKEN_SCOPES,
};
use richchat_domain::{
    AccessTokenInfo, AuthConfig, AuthOutcome, AuthState, IdTokenClaims, IdTokenInfo, LocalUser,
    ProviderKind, Result, RichChatError, ServiceScope,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::ports::{AuthProvider, FrameHandle, SilentFrameHost};

/// Scopes the Azure directory token needs in the configured scope list
const AZURE_DIRECTORY_SCOPES: [&str; 2] =
    [GRAPH_USER_READ_WRITE_SCOPE, GRAPH_USER_READ_BASIC_ALL_SCOPE];
const GOOGLE_DIRECTORY_SCOPES: [&str; 1] = [GOOGLE_CONTACTS_SCOPE];

#[derive(Debug)]
struct TokenState {
    status: AuthState,
    id_token: Option<IdTokenInfo>,
    local_user: Option<LocalUser>,
    access_tokens: HashMap<ServiceScope, AccessTokenInfo>,
    /// The redirect response can only be consumed once per page load
    resumed: bool,
}

impl Default for TokenState {
    fn default() -> Self {
        Self {
            status: AuthState::Unauthenticated,
            id_token: None,
            local_user: None,
            access_tokens: HashMap::new(),
            resumed: false,
        }
    }
}

/// Removes the hidden frame when the refresh finishes, fails, times out or
/// is dropped.
struct FrameGuard {
    host: Arc<dyn SilentFrameHost>,
    frame: FrameHandle,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        self.host.remove_frame(self.frame);
        debug!(frame = %self.frame.0, "Silent refresh frame removed");
    }
}

/// Puts the status back if a refresh future is dropped before it finishes.
struct RefreshingGuard<'a> {
    state: &'a Mutex<TokenState>,
    previous: AuthState,
    armed: bool,
}

impl RefreshingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RefreshingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.state.lock();
        if inner.status == AuthState::Refreshing {
            inner.status = self.previous;
            debug!(status = %self.previous, "Refresh abandoned, status restored");
        }
    }
}

/// OAuth2 token manager for the Azure and Google providers
///
/// All state sits behind one mutex that is never held across an await, so
/// the manager is safe to share between tasks.
pub struct TokenManager {
    config: AuthConfig,
    session_store: Arc<dyn SessionStore>,
    frames: Arc<dyn SilentFrameHost>,
    clock: Arc<dyn Clock>,
    inner: Mutex<TokenState>,
}

impl TokenManager {
    /// Create a token manager for a redirect-based provider
    ///
    /// # Errors
    /// Returns `RichChatError::Config` when the provider is `Mock` or when
    /// no scope is configured.
    pub fn new(
        config: AuthConfig,
        session_store: Arc<dyn SessionStore>,
        frames: Arc<dyn SilentFrameHost>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if config.provider == ProviderKind::Mock {
            return Err(RichChatError::Config(
                "token manager requires an azure or google provider".to_string(),
            ));
        }
        if config.scopes().next().is_none() {
            return Err(RichChatError::Config("Configuration scope is not defined".to_string()));
        }

        Ok(Self { config, session_store, frames, clock, inner: Mutex::new(TokenState::default()) })
    }

    #[must_use]
    pub fn provider(&self) -> ProviderKind {
        self.config.provider
    }

    /// First authentication phase
    ///
    /// Returns the local user when an id-token is already cached. Otherwise
    /// stores the nonce hash and returns the authorization URL the host must
    /// navigate to.
    ///
    /// # Errors
    /// Returns `RichChatError::Storage` if the nonce hash cannot be stored and
    /// `RichChatError::Config` if the authorization service URL is invalid.
    pub fn begin_authentication(&self) -> Result<AuthOutcome> {
        if let Some(user) = self.cached_local_user() {
            debug!(user_id = %user.user_id, "Id token cached, skipping redirect");
            return Ok(AuthOutcome::Authenticated(user));
        }

        let scope = self.id_token_scope();
        let nonce = codec::generate_nonce();
        self.session_store.set(NONCE_HASH_KEY, &codec::hash_nonce(&nonce)).map_err(storage_error)?;

        let mut params = self.client_params();
        params.extend([
            ("scope", scope.as_str()),
            ("prompt", "consent"),
            ("response_type", "id_token"),
            ("nonce", nonce.as_str()),
        ]);
        let url = codec::authorization_url(&self.config.auth_service, params).map_err(codec_error)?;

        self.inner.lock().status = AuthState::PendingRedirect;
        info!(provider = %self.config.provider, "Redirecting to authorization service for id token");
        Ok(AuthOutcome::RedirectRequired(url))
    }

    /// Second authentication phase, run on the page the redirect lands on
    ///
    /// # Errors
    /// - `RichChatError::InvalidState` when called a second time
    /// - `RichChatError::Auth` when the fragment carries an `error`
    /// - `RichChatError::MalformedToken` for an undecodable token or missing
    ///   subject/nonce claims
    /// - `RichChatError::InvalidNonce` when the stored hash is missing or
    ///   differs
    pub fn resume_from_redirect(&self, fragment: &str) -> Result<LocalUser> {
        {
            let mut inner = self.inner.lock();
            if inner.resumed {
                return Err(RichChatError::InvalidState(
                    "redirect response already consumed".to_string(),
                ));
            }
            inner.resumed = true;
        }

        match self.complete_id_token(fragment) {
            Ok((id_token, user)) => {
                let mut inner = self.inner.lock();
                inner.id_token = Some(id_token);
                inner.local_user = Some(user.clone());
                inner.status = AuthState::Authenticated;
                info!(user_id = %user.user_id, provider = %self.config.provider, "Authenticated");
                Ok(user)
            }
            Err(err) => {
                self.inner.lock().status = AuthState::Failed;
                error!(reason = err.reason(), error = %err, "Authentication failed");
                Err(err)
            }
        }
    }

    /// Access token for `scope`
    ///
    /// Returns the cached token while it is unexpired, unless forced. Each
    /// scope is checked against its own expiry.
    ///
    /// # Errors
    /// - `RichChatError::MissingScope` if the directory scopes are not
    ///   configured
    /// - `RichChatError::NotAuthenticated` without an id-token
    /// - any silent refresh failure (`TokenTimeout`, `StateMismatch`, `Auth`,
    ///   `MalformedToken`), after which the id-token is invalidated
    pub async fn get_service_token(&self, scope: ServiceScope, force_refresh: bool) -> Result<String> {
        let now = self.clock.now_millis();
        if !force_refresh {
            if let Some(token) = self.inner.lock().access_tokens.get(&scope) {
                if token.is_valid_at(now) {
                    debug!(%scope, "Using cached access token");
                    return Ok(token.access_token.clone());
                }
            }
        }

        for required in self.required_scopes(scope) {
            if !self.config.has_scope(required) {
                warn!(%scope, missing = *required, "Configured scopes lack a directory scope");
                return Err(RichChatError::MissingScope(format!("{required} scope is missing")));
            }
        }

        let (login_hint, domain_hint, refreshing) = {
            let mut inner = self.inner.lock();
            let (login_hint, domain_hint) = inner
                .id_token
                .as_ref()
                .map(|token| (token.claims.login_hint.clone(), token.claims.tenant_id.clone()))
                .ok_or(RichChatError::NotAuthenticated)?;
            let previous = std::mem::replace(&mut inner.status, AuthState::Refreshing);
            let refreshing = RefreshingGuard { state: &self.inner, previous, armed: true };
            (login_hint, domain_hint, refreshing)
        };

        let scope_value = self.service_scope(scope);
        let refreshed = self
            .silent_refresh(&scope_value, login_hint.as_deref(), domain_hint.as_deref())
            .await;
        refreshing.disarm();

        let mut inner = self.inner.lock();
        match refreshed {
            Ok(token) => {
                if inner.id_token.is_none() {
                    // Signed out while the frame was loading
                    return Err(RichChatError::NotAuthenticated);
                }
                let value = token.access_token.clone();
                inner.access_tokens.insert(scope, token);
                inner.status = AuthState::Authenticated;
                info!(%scope, "Access token refreshed");
                Ok(value)
            }
            Err(err) => {
                inner.id_token = None;
                inner.access_tokens.remove(&scope);
                inner.status = AuthState::Unauthenticated;
                error!(
                    %scope,
                    reason = err.reason(),
                    error = %err,
                    "Failed to refresh access token, id token invalidated"
                );
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().id_token.is_some()
    }

    #[must_use]
    pub fn local_user_info(&self) -> Option<LocalUser> {
        self.inner.lock().local_user.clone()
    }

    /// Current lifecycle state
    ///
    /// An authenticated manager holding an expired access token reports
    /// `TokenExpired` until that token is refreshed.
    #[must_use]
    pub fn state(&self) -> AuthState {
        let inner = self.inner.lock();
        if inner.status == AuthState::Authenticated {
            let now = self.clock.now_millis();
            if inner.access_tokens.values().any(|token| !token.is_valid_at(now)) {
                return AuthState::TokenExpired;
            }
        }
        inner.status
    }

    pub fn sign_out(&self) {
        {
            let mut inner = self.inner.lock();
            inner.id_token = None;
            inner.local_user = None;
            inner.access_tokens.clear();
            inner.status = AuthState::Unauthenticated;
        }
        if let Err(err) = self.session_store.remove(NONCE_HASH_KEY) {
            warn!(error = %err, "Failed to clear stored nonce hash");
        }
        info!("Signed out");
    }

    fn cached_local_user(&self) -> Option<LocalUser> {
        let inner = self.inner.lock();
        inner.id_token.as_ref().and(inner.local_user.clone())
    }

    fn client_params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        if let Some(resource) = self.config.resource.as_deref() {
            params.push(("resource", resource));
        }
        params
    }

    /// Configured scopes plus `profile`, `email` and `openid` when absent
    fn id_token_scope(&self) -> String {
        let mut scopes: Vec<&str> = self.config.scopes().collect();
        for required in REQUIRED_ID_TOKEN_SCOPES {
            if !scopes.iter().any(|scope| scope.eq_ignore_ascii_case(required)) {
                debug!(scope = required, "Adding scope required for id token");
                scopes.push(required);
            }
        }
        scopes.join(" ")
    }

    fn service_scope(&self, scope: ServiceScope) -> String {
        match (self.config.provider, scope) {
            (ProviderKind::Google, ServiceScope::Messaging) => "profile openid email".to_string(),
            (ProviderKind::Google, ServiceScope::Directory) => GOOGLE_CONTACTS_SCOPE.to_string(),
            (_, ServiceScope::Messaging) => {
                format!("profile openid api://{}/Messaging.All", self.config.client_id)
            }
            (_, ServiceScope::Directory) => format!(
                "profile openid {GRAPH_USER_READ_WRITE_SCOPE} {GRAPH_USER_READ_BASIC_ALL_SCOPE}"
            ),
        }
    }

    fn required_scopes(&self, scope: ServiceScope) -> &'static [&'static str] {
        match (self.config.provider, scope) {
            (_, ServiceScope::Messaging) => &[],
            (ProviderKind::Google, ServiceScope::Directory) => &GOOGLE_DIRECTORY_SCOPES,
            (_, ServiceScope::Directory) => &AZURE_DIRECTORY_SCOPES,
        }
    }

    fn complete_id_token(&self, fragment: &str) -> Result<(IdTokenInfo, LocalUser)> {
        // The hash is single use even when the response is rejected
        let stored_hash = self.session_store.take(NONCE_HASH_KEY).map_err(storage_error)?;

        let mut params =
            codec::parse_response_fragment(codec::fragment_of(fragment)).map_err(codec_error)?;
        let raw = codec::require_param(&mut params, "id_token").map_err(codec_error)?;
        let payload = codec::decode_payload(&raw).map_err(codec_error)?;
        let claims = self.map_claims(&payload)?;

        let Some(stored_hash) = stored_hash else {
            warn!("Failed to get stored nonce hash");
            return Err(RichChatError::InvalidNonce);
        };
        if !codec::nonce_matches(&claims.nonce, &stored_hash) {
            return Err(RichChatError::InvalidNonce);
        }

        let user = LocalUser::from(&claims);
        Ok((IdTokenInfo { raw, claims }, user))
    }

    /// Map provider-specific claim names onto [`IdTokenClaims`]
    fn map_claims(&self, payload: &Value) -> Result<IdTokenClaims> {
        let claim = |name: &str| codec::string_claim(payload, name).map(str::to_string);

        let (subject_claim, mapped) = match self.config.provider {
            ProviderKind::Google => (
                "sub",
                IdTokenClaims {
                    display_name: claim("name").or_else(|| claim("email")),
                    email: claim("email"),
                    avatar_url: claim("picture"),
                    login_hint: claim("email"),
                    ..IdTokenClaims::default()
                },
            ),
            _ => (
                "oid",
                IdTokenClaims {
                    tenant_id: claim("tid"),
                    display_name: claim("name").or_else(|| claim("preferred_username")),
                    email: claim("email"),
                    login_hint: claim("preferred_username"),
                    ..IdTokenClaims::default()
                },
            ),
        };

        let subject = claim(subject_claim).ok_or_else(|| {
            RichChatError::MalformedToken(format!("Missing {subject_claim} field in JWT token"))
        })?;
        let nonce = claim("nonce").ok_or_else(|| {
            RichChatError::MalformedToken("Missing nonce field in JWT token".to_string())
        })?;

        Ok(IdTokenClaims { subject, nonce, ..mapped })
    }

    async fn silent_refresh(
        &self,
        scope: &str,
        login_hint: Option<&str>,
        domain_hint: Option<&str>,
    ) -> Result<AccessTokenInfo> {
        let state = codec::generate_state();
        let nonce = codec::generate_nonce();

        let mut params = self.client_params();
        if let Some(domain_hint) = domain_hint {
            params.push(("domain_hint", domain_hint));
        }
        if let Some(login_hint) = login_hint {
            params.push(("login_hint", login_hint));
        }
        params.extend([
            ("scope", scope),
            ("prompt", "none"),
            ("state", state.as_str()),
            ("response_type", "token"),
            ("nonce", nonce.as_str()),
        ]);
        let url = codec::authorization_url(&self.config.auth_service, params).map_err(codec_error)?;

        let frame = self.frames.create_frame().await?;
        let _guard = FrameGuard { host: Arc::clone(&self.frames), frame };

        let timeout = Duration::from_millis(self.config.refresh_timeout_ms);
        let final_url = match tokio::time::timeout(timeout, self.frames.navigate(frame, &url)).await
        {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout_ms = self.config.refresh_timeout_ms, "Request token timeout");
                return Err(RichChatError::TokenTimeout);
            }
        };

        let Some((_, fragment)) = final_url.split_once('#') else {
            return Err(RichChatError::MalformedToken("Failed to extract token".to_string()));
        };
        let mut response = codec::parse_response_fragment(fragment).map_err(codec_error)?;

        let returned_state = response.remove("state").unwrap_or_default();
        if !codec::validate_state(&state, &returned_state) {
            return Err(RichChatError::StateMismatch);
        }

        let access_token = codec::require_param(&mut response, "access_token").map_err(codec_error)?;
        let expires_in = codec::require_param(&mut response, "expires_in")
            .map_err(codec_error)?
            .parse::<u64>()
            .map_err(|e| RichChatError::MalformedToken(format!("Invalid expires_in: {e}")))?;

        Ok(AccessTokenInfo::issued(access_token, expires_in, self.clock.now_millis()))
    }
}

#[async_trait]
impl AuthProvider for TokenManager {
    async fn authenticate(&self) -> Result<AuthOutcome> {
        self.begin_authentication()
    }

    async fn resume_from_redirect(&self, fragment: &str) -> Result<LocalUser> {
        TokenManager::resume_from_redirect(self, fragment)
    }

    async fn get_service_token(&self, scope: ServiceScope, force_refresh: bool) -> Result<String> {
        TokenManager::get_service_token(self, scope, force_refresh).await
    }

    fn is_authenticated(&self) -> bool {
        TokenManager::is_authenticated(self)
    }

    fn local_user_info(&self) -> Option<LocalUser> {
        TokenManager::local_user_info(self)
    }

    fn state(&self) -> AuthState {
        TokenManager::state(self)
    }

    fn sign_out(&self) {
        TokenManager::sign_out(self);
    }
}

fn codec_error(err: CodecError) -> RichChatError {
    match err {
        CodecError::Provider { error, description } if description.is_empty() => {
            RichChatError::Auth(error)
        }
        CodecError::Provider { error, description } => {
            RichChatError::Auth(format!("{error}: {description}"))
        }
        CodecError::Url(message) => {
            RichChatError::Config(format!("Invalid authorization service URL: {message}"))
        }
        other => RichChatError::MalformedToken(other.to_string()),
    }
}

fn storage_error(err: StorageError) -> RichChatError {
    RichChatError::Storage(err.to_string())
}
