//! # RichChat Core
//!
//! Identity business logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for identity providers, directories, resolvers
//!   and hidden-frame hosts
//! - The OAuth token manager and the provider variants built on it
//! - The contact reconciler and its event listeners
//!
//! ## Architecture Principles
//! - Only depends on `richchat-common` and `richchat-domain`
//! - No HTTP, browser or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod contacts;
pub mod session;

// Re-export specific items to avoid ambiguity
pub use auth::ports::{AuthProvider, FrameHandle, SilentFrameHost, UserIdSource};
pub use auth::{AuthDependencies, AuthManager, FixedUserId, MockAuthenticator, TokenManager};
pub use contacts::events::{ListenerId, ListenerRegistry, ListenerResult, UserListener};
pub use contacts::ports::{DirectoryProvider, IdentityResolver};
pub use contacts::ContactReconciler;
pub use session::SessionContext;
