//! # BusWay Testing
//!
//! Testing utilities and helpers for BusWay views.
//!
//! This crate provides:
//! - [`MockBusApi`]: a scripted, call-recording stand-in for the booking API
//! - [`ReducerTest`]: Given-When-Then reducer assertions
//! - Effect runners that resolve a reducer's effects without a Store
//! - Fixtures and proptest strategies for buses and seats
//!
//! ## Example
//!
//! ```ignore
//! use busway_testing::{fixtures, MockBusApi};
//! use busway_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_seat_flow() {
//!     let api = MockBusApi::new().with_bus(fixtures::bus(1, &[(10, "A1", false)]));
//!     let store = Store::new(SeatsState::default(), SeatsReducer::new(), env(api.clone()));
//!
//!     store.send(SeatsAction::Load { bus_id: BusId::new(1) }).await?;
//! }
//! ```

use busway_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod effects;
pub mod fixtures;
pub mod mock_api;
pub mod properties;

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use busway_testing::mocks::FixedClock;
    /// use busway_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use effects::{run_effects, settle};
pub use mock_api::{ApiCall, MockBusApi};
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};
