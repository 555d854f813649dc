//! Seat map and booking flow for one bus
//!
//! Each seat moves through a small state machine:
//!
//! ```text
//! Available --BookSeat--> Pending --confirmed--> Booked
//!                            |
//!                            +--rejected--> Available (+ error notification)
//! ```
//!
//! `Booked` is terminal. A `Pending` seat cannot be submitted again, so at
//! most one request is in flight per seat; requests for different seats are
//! independent. After a confirmation the bus is fetched again and the seat
//! list is reconciled with the server, without ever downgrading a seat this
//! view saw confirmed.
//!
//! Completions carry the bus they were issued for. If the view has since
//! moved to another bus (or was torn down) they are ignored.

use crate::environment::ViewEnvironment;
use crate::navigation::Route;
use crate::notification::Notification;
use busway_api::{ApiError, BookingConfirmation, Bus, BusId, SeatId};
use busway_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};

/// Shown when the bus cannot be fetched
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load bus details.";

/// Shown when a booking is confirmed
pub const BOOKED_MESSAGE: &str = "Seat booked successfully!";

/// Shown when a booking is refused without a server explanation
pub const REJECTED_FALLBACK_MESSAGE: &str = "Seat already booked!";

// ============================================================================
// State
// ============================================================================

/// Booking state of one seat as this view sees it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeatStatus {
    /// Can be booked
    Available,
    /// Booking request in flight
    Pending,
    /// Booked (terminal)
    Booked,
}

/// One seat of the map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatView {
    /// Seat identifier
    pub id: SeatId,
    /// Label shown on the seat
    pub label: String,
    /// Current status
    pub status: SeatStatus,
}

/// Lifecycle of the view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SeatsPhase {
    /// No bus requested yet
    #[default]
    Idle,
    /// Fetching the bus
    Loading,
    /// Seat map available
    Loaded,
    /// Fetch failed; no seat map is shown
    Failed(String),
}

/// State of the seat view
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeatsState {
    /// Bus the view shows
    pub bus_id: Option<BusId>,
    /// Lifecycle
    pub phase: SeatsPhase,
    /// Bus details for the header; its `seats` are moved into [`SeatsState::seats`]
    pub bus: Option<Bus>,
    /// Seats in server order
    pub seats: Vec<SeatView>,
    /// Seat most recently booked from this view
    pub selected: Option<SeatId>,
    /// Queued messages, oldest first
    pub notifications: Vec<Notification>,
    /// Route the view asks the shell to switch to
    pub navigate_to: Option<Route>,
}

impl SeatsState {
    /// Seat with `seat_id`
    #[must_use]
    pub fn seat(&self, seat_id: SeatId) -> Option<&SeatView> {
        self.seats.iter().find(|seat| seat.id == seat_id)
    }

    fn seat_mut(&mut self, seat_id: SeatId) -> Option<&mut SeatView> {
        self.seats.iter_mut().find(|seat| seat.id == seat_id)
    }

    /// Status of the seat with `seat_id`
    #[must_use]
    pub fn status(&self, seat_id: SeatId) -> Option<SeatStatus> {
        self.seat(seat_id).map(|seat| seat.status)
    }

    /// Number of seats with `status`
    #[must_use]
    pub fn count(&self, status: SeatStatus) -> usize {
        self.seats.iter().filter(|seat| seat.status == status).count()
    }

    /// True if a completion for `bus_id` still belongs to this view
    fn is_current(&self, bus_id: BusId) -> bool {
        self.bus_id == Some(bus_id) && self.phase == SeatsPhase::Loaded
    }

    fn show_bus(&mut self, mut bus: Bus) {
        self.seats = std::mem::take(&mut bus.seats)
            .into_iter()
            .map(|seat| SeatView {
                id: seat.id,
                label: seat.seat_number,
                status: if seat.is_booked {
                    SeatStatus::Booked
                } else {
                    SeatStatus::Available
                },
            })
            .collect();
        self.bus = Some(bus);
        self.phase = SeatsPhase::Loaded;
    }

    /// Replace the seat list with a fresh server copy
    ///
    /// Local `Booked` never goes back to `Available`, and local `Pending`
    /// survives until its own completion arrives.
    fn reconcile(&mut self, mut bus: Bus) {
        let fresh = std::mem::take(&mut bus.seats);
        let seats = fresh
            .into_iter()
            .map(|seat| {
                let local = self.status(seat.id);
                let status = match (seat.is_booked, local) {
                    (true, _) | (false, Some(SeatStatus::Booked)) => SeatStatus::Booked,
                    (false, Some(SeatStatus::Pending)) => SeatStatus::Pending,
                    (false, _) => SeatStatus::Available,
                };
                SeatView {
                    id: seat.id,
                    label: seat.seat_number,
                    status,
                }
            })
            .collect();
        self.seats = seats;
        self.bus = Some(bus);
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Inputs to the seat view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeatsAction {
    // User commands
    /// Enter the view for a bus
    Load {
        /// Bus to show
        bus_id: BusId,
    },

    /// Ask to book a seat
    BookSeat {
        /// Seat to book
        seat_id: SeatId,
    },

    /// Drop all queued notifications
    DismissNotifications,

    /// The shell followed the navigation request
    NavigationHandled,

    // Completions
    /// Bus fetched
    BusLoaded {
        /// Bus the request was for
        bus_id: BusId,
        /// Server copy
        bus: Bus,
    },

    /// Bus fetch failed
    BusLoadFailed {
        /// Bus the request was for
        bus_id: BusId,
        /// Failure description, for logs
        error: String,
    },

    /// Server accepted a booking
    BookingConfirmed {
        /// Bus the seat belongs to
        bus_id: BusId,
        /// Booked seat
        seat_id: SeatId,
        /// Server response
        confirmation: BookingConfirmation,
    },

    /// Server refused a booking
    BookingRejected {
        /// Bus the seat belongs to
        bus_id: BusId,
        /// Seat that stays available
        seat_id: SeatId,
        /// Server explanation, if any
        detail: Option<String>,
        /// The token was refused
        auth_required: bool,
    },

    /// Fresh copy of the bus after a confirmation
    BusReconciled {
        /// Bus the request was for
        bus_id: BusId,
        /// Server copy
        bus: Bus,
    },
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer for the seat view
#[derive(Clone, Debug, Default)]
pub struct SeatsReducer;

impl SeatsReducer {
    /// Creates a new `SeatsReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load(bus_id: BusId, env: &ViewEnvironment) -> Effect<SeatsAction> {
        let api = env.api.clone();
        async_effect! {
            match api.get_bus(bus_id).await {
                Ok(bus) => Some(SeatsAction::BusLoaded { bus_id, bus }),
                Err(error) => Some(SeatsAction::BusLoadFailed {
                    bus_id,
                    error: error.to_string(),
                }),
            }
        }
    }

    fn reconcile(bus_id: BusId, env: &ViewEnvironment) -> Effect<SeatsAction> {
        let api = env.api.clone();
        async_effect! {
            match api.get_bus(bus_id).await {
                Ok(bus) => Some(SeatsAction::BusReconciled { bus_id, bus }),
                Err(error) => {
                    tracing::warn!(%bus_id, %error, "Reconcile fetch failed; keeping local seats");
                    None
                },
            }
        }
    }

    fn book(
        bus_id: BusId,
        seat_id: SeatId,
        env: &ViewEnvironment,
    ) -> Option<Effect<SeatsAction>> {
        let session = env.session.as_ref()?;
        let request = env.api.book_seat(seat_id, session.token());

        Some(async_effect! {
            match request.await {
                Ok(confirmation) => Some(SeatsAction::BookingConfirmed {
                    bus_id,
                    seat_id,
                    confirmation,
                }),
                Err(error) => Some(SeatsAction::BookingRejected {
                    bus_id,
                    seat_id,
                    detail: error.detail().map(str::to_owned),
                    auth_required: matches!(error, ApiError::Unauthorized { .. }),
                }),
            }
        })
    }
}

impl Reducer for SeatsReducer {
    type State = SeatsState;
    type Action = SeatsAction;
    type Environment = ViewEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SeatsAction::Load { bus_id } => {
                *state = SeatsState {
                    bus_id: Some(bus_id),
                    phase: SeatsPhase::Loading,
                    ..SeatsState::default()
                };
                smallvec![Self::load(bus_id, env)]
            },

            SeatsAction::BookSeat { seat_id } => {
                let Some(bus_id) = state.bus_id.filter(|_| state.phase == SeatsPhase::Loaded)
                else {
                    return smallvec![Effect::None];
                };

                match state.status(seat_id) {
                    Some(SeatStatus::Available) => {},
                    Some(SeatStatus::Pending | SeatStatus::Booked) => {
                        tracing::debug!(%seat_id, "Seat is not bookable; ignoring");
                        return smallvec![Effect::None];
                    },
                    None => {
                        tracing::warn!(%seat_id, "Unknown seat; ignoring");
                        return smallvec![Effect::None];
                    },
                }

                let Some(effect) = Self::book(bus_id, seat_id, env) else {
                    tracing::debug!("No session; redirecting to login");
                    state.navigate_to = Some(Route::Login);
                    return smallvec![Effect::None];
                };

                if let Some(seat) = state.seat_mut(seat_id) {
                    seat.status = SeatStatus::Pending;
                }
                smallvec![effect]
            },

            SeatsAction::DismissNotifications => {
                state.notifications.clear();
                smallvec![Effect::None]
            },

            SeatsAction::NavigationHandled => {
                state.navigate_to = None;
                smallvec![Effect::None]
            },

            SeatsAction::BusLoaded { bus_id, bus } => {
                if state.bus_id == Some(bus_id) && state.phase == SeatsPhase::Loading {
                    state.show_bus(bus);
                }
                smallvec![Effect::None]
            },

            SeatsAction::BusLoadFailed { bus_id, error } => {
                if state.bus_id == Some(bus_id) && state.phase == SeatsPhase::Loading {
                    tracing::warn!(%bus_id, %error, "Bus fetch failed");
                    state.phase = SeatsPhase::Failed(LOAD_FAILED_MESSAGE.to_string());
                    state.seats.clear();
                }
                smallvec![Effect::None]
            },

            SeatsAction::BookingConfirmed {
                bus_id, seat_id, ..
            } => {
                if !state.is_current(bus_id) {
                    return smallvec![Effect::None];
                }
                let Some(seat) = state.seat_mut(seat_id) else {
                    return smallvec![Effect::None];
                };

                seat.status = SeatStatus::Booked;
                state.selected = Some(seat_id);
                state
                    .notifications
                    .push(Notification::success(BOOKED_MESSAGE, env.clock.now()));

                smallvec![Self::reconcile(bus_id, env)]
            },

            SeatsAction::BookingRejected {
                bus_id,
                seat_id,
                detail,
                auth_required,
            } => {
                if !state.is_current(bus_id) {
                    return smallvec![Effect::None];
                }
                let Some(seat) = state.seat_mut(seat_id) else {
                    return smallvec![Effect::None];
                };

                if seat.status == SeatStatus::Pending {
                    seat.status = SeatStatus::Available;
                }
                let message = detail.unwrap_or_else(|| REJECTED_FALLBACK_MESSAGE.to_string());
                state
                    .notifications
                    .push(Notification::error(message, env.clock.now()));
                if auth_required {
                    state.navigate_to = Some(Route::Login);
                }

                smallvec![Effect::None]
            },

            SeatsAction::BusReconciled { bus_id, bus } => {
                if state.is_current(bus_id) {
                    state.reconcile(bus);
                }
                smallvec![Effect::None]
            },
        }
    }
}
