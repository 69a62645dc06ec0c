//! Signed-in user context shared by the reconciler and UI collaborators

use parking_lot::RwLock;
use richchat_domain::{LocalUser, Result, RichChatError};

use crate::auth::ports::AuthProvider;

/// Holds the local user and the registration id the messaging SDK assigned
#[derive(Debug)]
pub struct SessionContext {
    local_user: RwLock<LocalUser>,
}

impl SessionContext {
    #[must_use]
    pub fn new(local_user: LocalUser) -> Self {
        Self { local_user: RwLock::new(local_user) }
    }

    /// Snapshot the provider's local user and attach a registration id.
    ///
    /// # Errors
    /// Returns `RichChatError::NotAuthenticated` if the provider has no local
    /// user yet.
    pub fn from_provider(
        provider: &dyn AuthProvider,
        registration_id: Option<String>,
    ) -> Result<Self> {
        let mut local_user = provider.local_user_info().ok_or(RichChatError::NotAuthenticated)?;
        if registration_id.is_some() {
            local_user.registration_id = registration_id;
        }
        Ok(Self::new(local_user))
    }

    #[must_use]
    pub fn local_user(&self) -> LocalUser {
        self.local_user.read().clone()
    }

    pub fn set_registration_id(&self, registration_id: impl Into<String>) {
        self.local_user.write().registration_id = Some(registration_id.into());
    }

    /// Whether `registration_id` belongs to the signed-in user.
    #[must_use]
    pub fn is_local(&self, registration_id: &str) -> bool {
        self.local_user.read().registration_id.as_deref() == Some(registration_id)
    }
}
