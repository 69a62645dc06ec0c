//! OAuth token and authentication state types

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::LocalUser;
use crate::impl_domain_status_conversions;

/// Backend service an access token is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceScope {
    /// Messaging backend used by the chat SDK
    Messaging,
    /// Directory service used by the contact reconciler
    Directory,
}

impl_domain_status_conversions!(ServiceScope {
    Messaging => "messaging",
    Directory => "directory",
});

/// Access token for one scope set
///
/// Replaced wholesale on refresh; `expires_at_ms` is fixed at issuance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenInfo {
    pub access_token: String,
    /// Unix epoch milliseconds
    pub expires_at_ms: u64,
}

impl AccessTokenInfo {
    /// Stamp a freshly issued token: `expires_at = now + expires_in * 1000`.
    #[must_use]
    pub fn issued(access_token: String, expires_in_secs: u64, now_ms: u64) -> Self {
        Self { access_token, expires_at_ms: now_ms.saturating_add(expires_in_secs.saturating_mul(1000)) }
    }

    /// A token is usable while `expires_at > now`.
    #[must_use]
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        self.expires_at_ms > now_ms
    }
}

impl fmt::Debug for AccessTokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenInfo")
            .field("access_token", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

/// Claims extracted from a validated id-token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub subject: String,
    pub tenant_id: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Hint passed back to the authorization server on silent refresh
    pub login_hint: Option<String>,
    pub nonce: String,
}

/// Id-token obtained from one redirect round trip
#[derive(Clone, PartialEq, Eq)]
pub struct IdTokenInfo {
    pub raw: String,
    pub claims: IdTokenClaims,
}

impl fmt::Debug for IdTokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdTokenInfo").field("raw", &"<redacted>").field("claims", &self.claims).finish()
    }
}

impl From<&IdTokenClaims> for LocalUser {
    fn from(claims: &IdTokenClaims) -> Self {
        Self {
            user_id: claims.subject.clone(),
            display_name: claims.display_name.clone(),
            email: claims.email.clone(),
            avatar_url: claims.avatar_url.clone(),
            registration_id: None,
        }
    }
}

/// Token manager lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    Unauthenticated,
    PendingRedirect,
    Authenticated,
    TokenExpired,
    Refreshing,
    Failed,
}

impl_domain_status_conversions!(AuthState {
    Unauthenticated => "unauthenticated",
    PendingRedirect => "pending_redirect",
    Authenticated => "authenticated",
    TokenExpired => "token_expired",
    Refreshing => "refreshing",
    Failed => "failed",
});

/// Outcome of the first authentication phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The host must navigate the page to this URL; the current continuation
    /// is abandoned and the next page load resumes from the fragment.
    RedirectRequired(String),
    /// Identity is already established
    Authenticated(LocalUser),
}

impl AuthOutcome {
    #[must_use]
    pub fn local_user(&self) -> Option<&LocalUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::RedirectRequired(_) => None,
        }
    }
}
