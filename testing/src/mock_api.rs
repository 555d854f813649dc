//! Scripted stand-in for the booking API
//!
//! Behaves like a small in-memory server by default: buses registered with
//! [`MockBusApi::with_bus`] can be fetched and booked, and a booked seat stays
//! booked. Individual calls can be scripted to fail. Every call is recorded at
//! the moment the request is issued, before any latency elapses.

use busway_api::{
    ApiError, ApiFuture, ApiResult, AuthToken, Booking, BookingConfirmation, Bus, BusApi, BusId,
    Credentials, LoginResponse, Registration, Related, SeatId, SeatSummary, UserId,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A request observed by [`MockBusApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /api/buses/`
    ListBuses,
    /// `GET /api/buses/{id}`
    GetBus(BusId),
    /// `POST /api/booking/`
    BookSeat {
        /// Requested seat
        seat_id: SeatId,
        /// Token sent in the `Authorization` header
        token: String,
    },
    /// `POST /api/login/`
    Login {
        /// Submitted username
        username: String,
    },
    /// `POST /api/register/`
    Register {
        /// Submitted username
        username: String,
    },
    /// `GET /api/user/{id}/bookings/`
    UserBookings {
        /// Requested user
        user_id: UserId,
        /// Token sent in the `Authorization` header
        token: String,
    },
}

struct Account {
    username: String,
    password: String,
    token: AuthToken,
    user_id: UserId,
}

#[derive(Default)]
struct Inner {
    buses: Vec<Bus>,
    accounts: Vec<Account>,
    bookings: HashMap<UserId, Vec<Booking>>,
    list_failures: VecDeque<ApiError>,
    get_bus_failures: VecDeque<ApiError>,
    booking_results: VecDeque<ApiResult<BookingConfirmation>>,
    register_results: VecDeque<ApiResult<()>>,
    user_bookings_failures: VecDeque<ApiError>,
    latency: Option<Duration>,
    calls: Vec<ApiCall>,
}

impl Inner {
    fn seat_booked(&self, seat_id: SeatId) -> Option<bool> {
        self.buses
            .iter()
            .flat_map(|bus| &bus.seats)
            .find(|seat| seat.id == seat_id)
            .map(|seat| seat.is_booked)
    }

    fn set_booked(&mut self, seat_id: SeatId) {
        for seat in self.buses.iter_mut().flat_map(|bus| bus.seats.iter_mut()) {
            if seat.id == seat_id {
                seat.is_booked = true;
            }
        }
    }

    fn book(&mut self, seat_id: SeatId) -> ApiResult<BookingConfirmation> {
        if let Some(scripted) = self.booking_results.pop_front() {
            if scripted.is_ok() {
                self.set_booked(seat_id);
            }
            return scripted;
        }

        match self.seat_booked(seat_id) {
            None => Err(ApiError::Rejected {
                status: 404,
                detail: Some("Not found.".to_string()),
            }),
            Some(true) => Err(ApiError::Rejected {
                status: 400,
                detail: Some("This seat is already booked.".to_string()),
            }),
            Some(false) => {
                self.set_booked(seat_id);
                Ok(BookingConfirmation {
                    seat: Some(Related::Expanded(SeatSummary {
                        id: Some(seat_id),
                        seat_number: None,
                    })),
                    ..BookingConfirmation::default()
                })
            },
        }
    }
}

/// In-memory, call-recording [`BusApi`]
///
/// Clones share state, so a test can keep one handle and give another to the
/// view under test.
#[derive(Clone, Default)]
pub struct MockBusApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockBusApi {
    /// Empty API: no buses, no accounts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `bus` from the list and detail endpoints
    #[must_use]
    pub fn with_bus(self, bus: Bus) -> Self {
        self.lock().buses.push(bus);
        self
    }

    /// Accept `username`/`password` and answer with `token` for `user_id`
    #[must_use]
    pub fn with_account(self, username: &str, password: &str, token: &str, user_id: u64) -> Self {
        self.lock().accounts.push(Account {
            username: username.to_string(),
            password: password.to_string(),
            token: AuthToken::new(token),
            user_id: UserId::new(user_id),
        });
        self
    }

    /// Serve `bookings` as the history of `user_id`
    #[must_use]
    pub fn with_bookings(self, user_id: u64, bookings: Vec<Booking>) -> Self {
        self.lock().bookings.insert(UserId::new(user_id), bookings);
        self
    }

    /// Delay every response by `latency`
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Fail the next `list_buses` call
    pub fn fail_next_list(&self, error: ApiError) {
        self.lock().list_failures.push_back(error);
    }

    /// Fail the next `get_bus` call
    pub fn fail_next_get_bus(&self, error: ApiError) {
        self.lock().get_bus_failures.push_back(error);
    }

    /// Answer the next `book_seat` call with `result`
    ///
    /// A scripted success still marks the seat booked.
    pub fn script_booking(&self, result: ApiResult<BookingConfirmation>) {
        self.lock().booking_results.push_back(result);
    }

    /// Answer the next `register` call with `result`
    pub fn script_register(&self, result: ApiResult<()>) {
        self.lock().register_results.push_back(result);
    }

    /// Fail the next `user_bookings` call
    pub fn fail_next_user_bookings(&self, error: ApiError) {
        self.lock().user_bookings_failures.push_back(error);
    }

    /// Book a seat behind the client's back (another passenger)
    pub fn book_elsewhere(&self, seat_id: SeatId) {
        self.lock().set_booked(seat_id);
    }

    /// Server-side booked flag of a seat, `None` if unknown
    #[must_use]
    pub fn seat_booked(&self, seat_id: SeatId) -> Option<bool> {
        self.lock().seat_booked(seat_id)
    }

    /// Every request issued so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of booking requests issued so far
    #[must_use]
    pub fn booking_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, ApiCall::BookSeat { .. }))
            .count()
    }

    /// Record `call` now and resolve `respond` after the configured latency
    fn respond<T, F>(&self, call: ApiCall, respond: F) -> ApiFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner) -> ApiResult<T> + Send + 'static,
    {
        let latency = {
            let mut inner = self.lock();
            inner.calls.push(call);
            inner.latency
        };
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            respond(&mut inner)
        })
    }
}

impl BusApi for MockBusApi {
    fn list_buses(&self) -> ApiFuture<Vec<Bus>> {
        self.respond(ApiCall::ListBuses, |inner| {
            inner
                .list_failures
                .pop_front()
                .map_or_else(|| Ok(inner.buses.clone()), Err)
        })
    }

    fn get_bus(&self, bus_id: BusId) -> ApiFuture<Bus> {
        self.respond(ApiCall::GetBus(bus_id), move |inner| {
            if let Some(error) = inner.get_bus_failures.pop_front() {
                return Err(error);
            }
            inner
                .buses
                .iter()
                .find(|bus| bus.id == bus_id)
                .cloned()
                .ok_or_else(|| ApiError::Rejected {
                    status: 404,
                    detail: Some("Not found.".to_string()),
                })
        })
    }

    fn book_seat(&self, seat_id: SeatId, token: &AuthToken) -> ApiFuture<BookingConfirmation> {
        let call = ApiCall::BookSeat {
            seat_id,
            token: token.expose().to_string(),
        };
        self.respond(call, move |inner| inner.book(seat_id))
    }

    fn login(&self, credentials: Credentials) -> ApiFuture<LoginResponse> {
        let call = ApiCall::Login {
            username: credentials.username.clone(),
        };
        self.respond(call, move |inner| {
            inner
                .accounts
                .iter()
                .find(|account| {
                    account.username == credentials.username
                        && account.password == credentials.password
                })
                .map(|account| LoginResponse {
                    token: account.token.clone(),
                    user_id: account.user_id,
                })
                .ok_or_else(|| ApiError::Unauthorized {
                    detail: Some("Invalid credentials".to_string()),
                })
        })
    }

    fn register(&self, registration: Registration) -> ApiFuture<()> {
        let call = ApiCall::Register {
            username: registration.username.clone(),
        };
        self.respond(call, |inner| inner.register_results.pop_front().unwrap_or(Ok(())))
    }

    fn user_bookings(&self, user_id: UserId, token: &AuthToken) -> ApiFuture<Vec<Booking>> {
        let call = ApiCall::UserBookings {
            user_id,
            token: token.expose().to_string(),
        };
        self.respond(call, move |inner| {
            if let Some(error) = inner.user_bookings_failures.pop_front() {
                return Err(error);
            }
            Ok(inner.bookings.get(&user_id).cloned().unwrap_or_default())
        })
    }
}
