//! The logged-in user's bookings

use crate::environment::ViewEnvironment;
use crate::navigation::Route;
use busway_api::{ApiError, Booking, Related};
use busway_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Placeholder for missing values
pub const NOT_AVAILABLE: &str = "N/A";

/// Header used when the booking carries no bus details
pub const BUS_FALLBACK_LABEL: &str = "Bus Details";

/// Lifecycle of the view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BookingsPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// Fetching
    Loading,
    /// Bookings available (possibly none)
    Loaded(Vec<Booking>),
    /// Fetch failed
    Failed(String),
}

/// State of the bookings view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingsState {
    /// Lifecycle
    pub phase: BookingsPhase,
    /// Route the view asks the shell to switch to
    pub navigate_to: Option<Route>,
}

impl BookingsState {
    /// Loaded bookings; empty while loading or after a failure
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        match &self.phase {
            BookingsPhase::Loaded(bookings) => bookings,
            _ => &[],
        }
    }
}

/// Inputs to the bookings view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingsAction {
    /// Enter the view
    Load,
    /// Bookings fetched
    Loaded {
        /// Server copy
        bookings: Vec<Booking>,
    },
    /// Fetch failed
    LoadFailed {
        /// Message to show
        message: String,
        /// The token was refused
        auth_required: bool,
    },
}

/// Reducer for the bookings view
#[derive(Clone, Debug, Default)]
pub struct BookingsReducer;

impl BookingsReducer {
    /// Creates a new `BookingsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for BookingsReducer {
    type State = BookingsState;
    type Action = BookingsAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingsAction::Load => {
                let Some(session) = &env.session else {
                    state.phase = BookingsPhase::Loaded(Vec::new());
                    return smallvec![Effect::None];
                };

                state.phase = BookingsPhase::Loading;
                state.navigate_to = None;
                let request = env.api.user_bookings(session.user_id(), session.token());
                smallvec![async_effect! {
                    match request.await {
                        Ok(bookings) => Some(BookingsAction::Loaded { bookings }),
                        Err(error) => Some(BookingsAction::LoadFailed {
                            message: error
                                .detail()
                                .map_or_else(|| error.to_string(), str::to_owned),
                            auth_required: matches!(error, ApiError::Unauthorized { .. }),
                        }),
                    }
                }]
            },

            BookingsAction::Loaded { bookings } => {
                if state.phase == BookingsPhase::Loading {
                    state.phase = BookingsPhase::Loaded(bookings);
                }
                smallvec![Effect::None]
            },

            BookingsAction::LoadFailed {
                message,
                auth_required,
            } => {
                if state.phase == BookingsPhase::Loading {
                    state.phase = BookingsPhase::Failed(message);
                    if auth_required {
                        state.navigate_to = Some(Route::Login);
                    }
                }
                smallvec![Effect::None]
            },
        }
    }
}

// ============================================================================
// Display helpers
// ============================================================================

/// `"{name} ({number})"`, or [`BUS_FALLBACK_LABEL`] without bus details
#[must_use]
pub fn bus_label(booking: &Booking) -> String {
    booking
        .bus
        .as_ref()
        .and_then(Related::expanded)
        .map_or_else(
            || BUS_FALLBACK_LABEL.to_string(),
            |bus| {
                format!(
                    "{} ({})",
                    bus.bus_name.as_deref().unwrap_or(NOT_AVAILABLE),
                    bus.number.as_deref().unwrap_or(NOT_AVAILABLE)
                )
            },
        )
}

/// Seat label, or [`NOT_AVAILABLE`]
#[must_use]
pub fn seat_label(booking: &Booking) -> &str {
    booking
        .seat
        .as_ref()
        .and_then(Related::expanded)
        .and_then(|seat| seat.seat_number.as_deref())
        .unwrap_or(NOT_AVAILABLE)
}

/// `"{origin} → {destination}"`, each side [`NOT_AVAILABLE`] when missing
#[must_use]
pub fn route_label(booking: &Booking) -> String {
    let side = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_AVAILABLE)
            .to_string()
    };
    format!("{} → {}", side(&booking.origin), side(&booking.destination))
}

/// Price as sent by the server, or [`NOT_AVAILABLE`]
#[must_use]
pub fn price_label(booking: &Booking) -> &str {
    booking
        .price
        .as_ref()
        .map(busway_api::Price::as_str)
        .filter(|price| !price.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

/// Booking time in RFC 3339, or [`NOT_AVAILABLE`]
#[must_use]
pub fn booked_at_label(booking: &Booking) -> String {
    booking.booking_time.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |time| time.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}
