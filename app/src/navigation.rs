//! Routes between views

use busway_api::BusId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A view the client can show
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// All buses, with filters (`/`)
    BusList,
    /// Seat map of one bus (`/bus/{id}`)
    BusSeats(BusId),
    /// Login form (`/login`)
    Login,
    /// Registration form (`/register`)
    Register,
    /// The user's bookings (`/my-bookings`)
    MyBookings,
}

impl Route {
    /// True for views that need a session to show anything useful
    #[must_use]
    pub const fn requires_session(self) -> bool {
        matches!(self, Self::MyBookings)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusList => f.write_str("/"),
            Self::BusSeats(bus_id) => write!(f, "/bus/{bus_id}"),
            Self::Login => f.write_str("/login"),
            Self::Register => f.write_str("/register"),
            Self::MyBookings => f.write_str("/my-bookings"),
        }
    }
}

/// Path that matches no route
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("No route for path {0:?}")]
pub struct UnknownRoute(pub String);

impl FromStr for Route {
    type Err = UnknownRoute;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Ok(Self::BusList),
            "/login" => Ok(Self::Login),
            "/register" => Ok(Self::Register),
            "/my-bookings" => Ok(Self::MyBookings),
            other => other
                .strip_prefix("/bus/")
                .and_then(|id| id.parse().ok())
                .map(Self::BusSeats)
                .ok_or_else(|| UnknownRoute(path.to_string())),
        }
    }
}
