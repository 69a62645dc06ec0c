//! # RichChat Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client and the Google People directory adapter
//! - Key-value persistence and the locally stored mock directory
//! - A channel-backed hidden-frame host
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `richchat-core`
//! - Contains all "impure" code (network, file system, environment)

pub mod config;
pub mod errors;
pub mod frames;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use errors::InfraError;
pub use frames::{ChannelFrameHost, FrameRequest};
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::GooglePeopleDirectory;
pub use storage::{JsonFileStore, LocalDirectory};
