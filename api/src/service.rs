//! The booking API as an injectable dependency
//!
//! Views hold an `Arc<dyn BusApi>` in their environment. Production code
//! passes a [`BusWayClient`]; tests pass a scripted mock.

use crate::{
    client::BusWayClient,
    error::ApiError,
    types::{
        AuthToken, Booking, BookingConfirmation, Bus, BusId, Credentials, LoginResponse,
        Registration, SeatId, UserId,
    },
};
use futures::future::BoxFuture;

/// Result type for booking API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Future returned by every [`BusApi`] operation
pub type ApiFuture<T> = BoxFuture<'static, ApiResult<T>>;

/// Booking API operations used by the views
///
/// Futures are `'static` so reducers can move them into effects.
pub trait BusApi: Send + Sync {
    /// List all buses
    fn list_buses(&self) -> ApiFuture<Vec<Bus>>;

    /// Fetch one bus with its seats
    fn get_bus(&self, bus_id: BusId) -> ApiFuture<Bus>;

    /// Book a seat on behalf of the token's owner
    fn book_seat(&self, seat_id: SeatId, token: &AuthToken) -> ApiFuture<BookingConfirmation>;

    /// Exchange credentials for a token
    fn login(&self, credentials: Credentials) -> ApiFuture<LoginResponse>;

    /// Create an account
    fn register(&self, registration: Registration) -> ApiFuture<()>;

    /// List the bookings owned by `user_id`
    fn user_bookings(&self, user_id: UserId, token: &AuthToken) -> ApiFuture<Vec<Booking>>;
}

impl BusApi for BusWayClient {
    fn list_buses(&self) -> ApiFuture<Vec<Bus>> {
        let client = self.clone();
        Box::pin(async move { client.list_buses().await })
    }

    fn get_bus(&self, bus_id: BusId) -> ApiFuture<Bus> {
        let client = self.clone();
        Box::pin(async move { client.get_bus(bus_id).await })
    }

    fn book_seat(&self, seat_id: SeatId, token: &AuthToken) -> ApiFuture<BookingConfirmation> {
        let client = self.clone();
        let token = token.clone();
        Box::pin(async move { client.book_seat(seat_id, &token).await })
    }

    fn login(&self, credentials: Credentials) -> ApiFuture<LoginResponse> {
        let client = self.clone();
        Box::pin(async move { client.login(&credentials).await })
    }

    fn register(&self, registration: Registration) -> ApiFuture<()> {
        let client = self.clone();
        Box::pin(async move { client.register(&registration).await })
    }

    fn user_bookings(&self, user_id: UserId, token: &AuthToken) -> ApiFuture<Vec<Booking>> {
        let client = self.clone();
        let token = token.clone();
        Box::pin(async move { client.user_bookings(user_id, &token).await })
    }
}
