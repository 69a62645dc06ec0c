//! HTTP client used by directory adapters

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
