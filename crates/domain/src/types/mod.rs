//! Domain types and models

pub mod auth;
pub mod user;

pub use auth::{
    AccessTokenInfo, AuthOutcome, AuthState, IdTokenClaims, IdTokenInfo, ServiceScope,
};
pub use user::{
    Contact, Identity, LocalUser, NewContact, UserEvent, UserEventKind, UserInfo,
};
