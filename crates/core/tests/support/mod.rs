//! Shared test helpers for `richchat-core` integration tests.
//!
//! In-memory directory and resolver mocks, a scripted hidden-frame host and a
//! recording listener, so the flow tests can focus on behaviour.

#![allow(dead_code)]

pub mod auth;
pub mod contacts;
pub mod frames;
