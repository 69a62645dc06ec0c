//! Testing utilities and helpers
//!
//! - **[`time`]**: manually advanced clock

pub mod time;

pub use time::MockClock;
