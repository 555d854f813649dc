//! # BusWay API Client
//!
//! Rust client for the BusWay booking API: buses and their seats, seat
//! bookings, login, registration, and a user's booking history.
//!
//! ## Example
//!
//! ```no_run
//! use busway_api::{BusId, BusWayClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = BusWayClient::new("http://127.0.0.1:8000")?;
//!
//!     let bus = client.get_bus(BusId::new(1)).await?;
//!     let free = bus.seats.iter().filter(|s| !s.is_booked).count();
//!
//!     println!("{} has {free} free seats", bus.name);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod service;
pub mod types;

// Re-export main types for convenience
pub use client::BusWayClient;
pub use error::ApiError;
pub use service::{ApiFuture, ApiResult, BusApi};
pub use types::{
    AuthToken, Booking, BookingConfirmation, BookingId, Bus, BusId, BusSummary, Credentials,
    FieldErrors, LoginResponse, Price, Registration, Related, Seat, SeatId, SeatSummary, UserId,
    UserSummary,
};
