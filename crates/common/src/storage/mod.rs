//! Key-value storage primitives
//!
//! Storage ports shared by the token manager (session-scoped nonce hash) and
//! the local contact directory, plus an in-memory implementation.

pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use traits::{KeyValueStore, SessionStore};
