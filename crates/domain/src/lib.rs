//! # RichChat Domain
//!
//! Identity and contact domain types for RichChat.
//!
//! This crate contains:
//! - Token, claim and authentication state types
//! - Contact and user records plus cache change events
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other RichChat crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
