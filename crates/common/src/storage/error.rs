//! Storage error types

use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    /// A stored value could not be read back
    #[error("Corrupt value for key {key}: {message}")]
    Corrupt { key: String, message: String },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    //! Unit tests for storage::error.
    use super::*;

    /// Validates `StorageError` display formatting for the error display
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `err.to_string()` names the corrupt key.
    /// - Confirms IO errors are displayed transparently.
    #[test]
    fn test_error_display() {
        let err = StorageError::Corrupt { key: "k".to_string(), message: "bad".to_string() };
        assert_eq!(err.to_string(), "Corrupt value for key k: bad");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(StorageError::from(io).to_string(), "gone");
    }
}
