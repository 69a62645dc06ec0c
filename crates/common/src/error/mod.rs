//! Codec error types
//!
//! Errors raised while encoding or decoding OAuth protocol artifacts: nonces,
//! JWT payloads, URL fragments and authorization URLs. Callers in the core
//! crate map these into the domain error taxonomy.

use thiserror::Error;

/// Failure while handling an OAuth wire artifact
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The token is not in `header.payload.signature` form
    #[error("Failed to find payload in token of length {0}")]
    MissingPayload(usize),

    #[error("Invalid base64: {0}")]
    Base64(String),

    #[error("Invalid JSON payload: {0}")]
    Json(String),

    #[error("Invalid percent-encoding: {0}")]
    PercentEncoding(String),

    #[error("Invalid URL: {0}")]
    Url(String),

    /// The authorization server reported an error in the response fragment
    #[error("{error}: {description}")]
    Provider { error: String, description: String },

    #[error("Missing parameter: {0}")]
    MissingParameter(String),
}

impl CodecError {
    /// Whether the authorization server itself rejected the request.
    #[must_use]
    pub fn is_provider_error(&self) -> bool {
        matches!(self, Self::Provider { .. })
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<base64::DecodeError> for CodecError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}

impl From<url::ParseError> for CodecError {
    fn from(err: url::ParseError) -> Self {
        Self::Url(err.to_string())
    }
}

/// Result alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
