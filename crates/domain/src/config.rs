//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AVATAR_URL, DEFAULT_REFRESH_TIMEOUT_MS, MAX_RESOLVE_BATCH_SIZE};
use crate::impl_domain_status_conversions;
use crate::{Result, RichChatError};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub contacts: ContactsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `RichChatError::Config` when an identity provider is selected
    /// without a client id, or when the resolve batch size is outside `1..=50`.
    pub fn validate(&self) -> Result<()> {
        if self.auth.provider != ProviderKind::Mock && self.auth.client_id.trim().is_empty() {
            return Err(RichChatError::Config(format!(
                "client_id is required for the {} provider",
                self.auth.provider
            )));
        }
        if self.auth.provider != ProviderKind::Mock && self.auth.auth_service.trim().is_empty() {
            return Err(RichChatError::Config("auth_service is required".to_string()));
        }
        let batch = self.contacts.resolve_batch_size;
        if batch == 0 || batch > MAX_RESOLVE_BATCH_SIZE {
            return Err(RichChatError::Config(format!(
                "resolve_batch_size must be between 1 and {MAX_RESOLVE_BATCH_SIZE}, got {batch}"
            )));
        }
        Ok(())
    }
}

/// Identity backend the application is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Microsoft identity platform with Graph directory
    Azure,
    /// Google OAuth with the People API directory
    Google,
    /// No identity provider; locally generated identities
    #[default]
    Mock,
}

impl_domain_status_conversions!(ProviderKind {
    Azure => "azure",
    Google => "google",
    Mock => "mock",
});

/// OAuth client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub provider: ProviderKind,
    /// Authorization endpoint
    pub auth_service: String,
    pub client_id: String,
    pub redirect_uri: String,
    /// Space separated scopes requested with the id-token
    pub scope: String,
    pub resource: Option<String>,
    pub tenant_id: Option<String>,
    /// Domain suffix for mock-directory storage keys
    pub domain_id: String,
    pub refresh_timeout_ms: u64,
}

impl AuthConfig {
    /// Configured scopes, split on whitespace.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes().any(|s| s == scope)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            auth_service: String::new(),
            client_id: String::new(),
            redirect_uri: String::new(),
            scope: String::new(),
            resource: None,
            tenant_id: None,
            domain_id: String::new(),
            refresh_timeout_ms: DEFAULT_REFRESH_TIMEOUT_MS,
        }
    }
}

/// Contact reconciliation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    pub resolve_batch_size: usize,
    pub placeholder_avatar_url: Option<String>,
    /// Override for the directory API base URL
    pub directory_base_url: Option<String>,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            resolve_batch_size: MAX_RESOLVE_BATCH_SIZE,
            placeholder_avatar_url: Some(DEFAULT_AVATAR_URL.to_string()),
            directory_base_url: None,
        }
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
