//! Dependencies injected into every view

use crate::session::Session;
use busway_api::BusApi;
use busway_core::environment::{Clock, SystemClock};
use std::sync::Arc;

/// What a view may touch outside its own state
///
/// The session is fixed when the view is composed. Logging in or out builds
/// new environments rather than mutating this one.
#[derive(Clone)]
pub struct ViewEnvironment {
    /// Booking API
    pub api: Arc<dyn BusApi>,
    /// Logged-in user, if any
    pub session: Option<Session>,
    /// Clock for notification timestamps
    pub clock: Arc<dyn Clock>,
}

impl ViewEnvironment {
    /// Environment backed by the system clock
    #[must_use]
    pub fn new(api: Arc<dyn BusApi>, session: Option<Session>) -> Self {
        Self {
            api,
            session,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
