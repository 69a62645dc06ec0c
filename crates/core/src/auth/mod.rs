//! Authentication: OAuth2 token lifecycle and provider variants
//!
//! # Module Organization
//!
//! - **[`ports`]**: `AuthProvider` contract and host capabilities
//! - **[`token_manager`]**: redirect + hidden-frame token state machine
//! - **[`mock`]**: provider for hosts without an OAuth server
//! - **[`manager`]**: configuration-time provider selection

pub mod manager;
pub mod mock;
pub mod ports;
pub mod token_manager;

pub use manager::{AuthDependencies, AuthManager};
pub use mock::{FixedUserId, MockAuthenticator};
pub use token_manager::TokenManager;
