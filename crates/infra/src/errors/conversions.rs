//! Conversions from external infrastructure errors into domain errors.

use std::io::Error as IoError;

use reqwest::Error as HttpError;
use reqwest::StatusCode;
use richchat_common::StorageError;
use richchat_domain::RichChatError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RichChatError);

impl From<InfraError> for RichChatError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RichChatError> for InfraError {
    fn from(value: RichChatError) -> Self {
        InfraError(value)
    }
}

impl InfraError {
    /// Map a non-success HTTP status returned by a remote provider.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!(
            "HTTP {} {}{}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status"),
            if body.is_empty() { String::new() } else { format!(": {body}") }
        );

        InfraError(match status.as_u16() {
            401 | 403 => RichChatError::Auth(message),
            404 => RichChatError::NotFound(message),
            409 => RichChatError::DuplicateContact(message),
            _ => RichChatError::ProviderUnavailable(message),
        })
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RichChatError */
/* -------------------------------------------------------------------------- */

trait IntoRichChatError {
    fn into_richchat(self) -> RichChatError;
}

impl IntoRichChatError for HttpError {
    fn into_richchat(self) -> RichChatError {
        if self.is_timeout() {
            return RichChatError::ProviderUnavailable("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RichChatError::ProviderUnavailable("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RichChatError::ProviderUnavailable(format!("invalid provider response: {self}"));
        }

        if let Some(status) = self.status() {
            return InfraError::from_status(status, "").0;
        }

        RichChatError::ProviderUnavailable(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_richchat())
    }
}

/* -------------------------------------------------------------------------- */
/* storage and io → RichChatError */
/* -------------------------------------------------------------------------- */

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        InfraError(RichChatError::Storage(value.to_string()))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(RichChatError::Storage(value.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
