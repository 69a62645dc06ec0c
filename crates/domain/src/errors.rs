//! Error types used throughout the identity layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for RichChat identity operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum RichChatError {
    /// The nonce carried by the id-token does not match the stored hash
    #[error("Invalid JWT nonce")]
    InvalidNonce,

    /// A token could not be decoded or lacks a required claim
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    /// The silent refresh frame did not come back in time
    #[error("Request token timeout")]
    TokenTimeout,

    /// The `state` echoed by the authorization server is not the one we sent
    #[error("Token state does not match")]
    StateMismatch,

    /// A required OAuth scope is absent from the configuration
    #[error("Missing scope: {0}")]
    MissingScope(String),

    /// The contact is already present in the local cache
    #[error("Duplicate contact: {0}")]
    DuplicateContact(String),

    /// The remote directory or identity provider call failed
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RichChatError {
    /// Stable label for the failure, suitable for UI messages and log fields.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidNonce => "invalid_nonce",
            Self::MalformedToken(_) => "malformed_token",
            Self::TokenTimeout => "token_timeout",
            Self::StateMismatch => "state_mismatch",
            Self::MissingScope(_) => "missing_scope",
            Self::DuplicateContact(_) => "duplicate_contact",
            Self::ProviderUnavailable(_) => "provider_unavailable",
            Self::NotAuthenticated => "not_authenticated",
            Self::Auth(_) => "auth",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidState(_) => "invalid_state",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the failure came out of the OAuth token flow.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidNonce
                | Self::MalformedToken(_)
                | Self::TokenTimeout
                | Self::StateMismatch
                | Self::MissingScope(_)
                | Self::NotAuthenticated
                | Self::Auth(_)
        )
    }
}

impl From<serde_json::Error> for RichChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON error: {err}"))
    }
}

/// Result type alias for RichChat operations
pub type Result<T> = std::result::Result<T, RichChatError>;
