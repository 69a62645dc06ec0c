//! Time mocking for deterministic tests
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use richchat_common::testing::MockClock;
//! use richchat_common::time::Clock;
//!
//! let clock = MockClock::at(1_000);
//! clock.advance(Duration::from_millis(500));
//! assert_eq!(clock.now_millis(), 1_500);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::time::Clock;

/// Mock clock for deterministic testing
///
/// Clones share the same time, so a clock handed to a component can be
/// advanced from the test body.
#[derive(Debug, Clone)]
pub struct MockClock {
    millis: Arc<AtomicU64>,
}

impl MockClock {
    /// Start at 2024-01-01T00:00:00Z.
    #[must_use]
    pub fn new() -> Self {
        Self::at(1_704_067_200_000)
    }

    /// Start at the given epoch milliseconds.
    #[must_use]
    pub fn at(millis: u64) -> Self {
        Self { millis: Arc::new(AtomicU64::new(millis)) }
    }

    /// Simulate time passing without actually waiting.
    pub fn advance(&self, duration: Duration) {
        let delta = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set_millis(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
