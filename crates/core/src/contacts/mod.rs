//! Contact reconciliation
//!
//! - **[`ports`]**: directory and identity-resolver contracts
//! - **[`events`]**: per-kind listener registry with isolated dispatch
//! - **[`batch`]**: bounded concurrent identity resolution
//! - **[`reconciler`]**: the cache-converging service

pub mod batch;
mod cache;
pub mod events;
pub mod ports;
pub mod reconciler;

pub use reconciler::ContactReconciler;
