//! Port interfaces for authentication
//!
//! These traits define the boundaries between the token state machine and
//! the host environment (hidden frames, user id prompts).

use async_trait::async_trait;
use richchat_domain::{AuthOutcome, AuthState, LocalUser, Result, RichChatError, ServiceScope};
use uuid::Uuid;

/// Shared contract of every identity provider variant
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Establish the local identity, or ask the host to redirect.
    async fn authenticate(&self) -> Result<AuthOutcome>;

    /// Complete a redirect round trip from the page's URL fragment.
    ///
    /// Providers without a redirect flow reject this call.
    async fn resume_from_redirect(&self, _fragment: &str) -> Result<LocalUser> {
        Err(RichChatError::InvalidState("provider does not use redirects".to_string()))
    }

    /// Access token for `scope`, refreshed when expired or when forced.
    async fn get_service_token(&self, scope: ServiceScope, force_refresh: bool) -> Result<String>;

    fn is_authenticated(&self) -> bool;

    fn local_user_info(&self) -> Option<LocalUser>;

    fn state(&self) -> AuthState;

    /// Forget the id-token and every cached access token.
    fn sign_out(&self);
}

/// Handle to one hidden frame created by a [`SilentFrameHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub Uuid);

impl FrameHandle {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FrameHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Host capability for silent token refresh in an invisible frame
#[async_trait]
pub trait SilentFrameHost: Send + Sync {
    async fn create_frame(&self) -> Result<FrameHandle>;

    /// Navigate the frame and wait for it to land back on the redirect URI.
    ///
    /// Returns the final URL, including its fragment.
    async fn navigate(&self, frame: FrameHandle, url: &str) -> Result<String>;

    /// Tear the frame down. Must be safe to call for unknown handles.
    fn remove_frame(&self, frame: FrameHandle);
}

/// Where the mock provider gets the local user id from
#[async_trait]
pub trait UserIdSource: Send + Sync {
    async fn user_id(&self) -> Result<String>;
}
