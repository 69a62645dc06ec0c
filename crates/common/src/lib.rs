//! Modular common utilities shared across RichChat crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: errors and OAuth protocol codecs (nonce, JWT, parameters)
//! - `runtime`: key-value storage, clocks
//! - `observability`: optional tracing (pulled in by `runtime`)
//! - `test-utils`: deterministic clocks for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;
#[cfg(feature = "foundation")]
pub mod error;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod storage;
#[cfg(feature = "runtime")]
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", all(test, feature = "runtime")))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CodecError, CodecResult};
#[cfg(feature = "runtime")]
pub use storage::{KeyValueStore, MemoryStore, SessionStore, StorageError, StorageResult};
#[cfg(feature = "runtime")]
pub use time::{Clock, SystemClock};
