//! Wire types for the BusWay booking API

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw identifier
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_type!(
    /// Identifier of a bus
    BusId
);
id_type!(
    /// Identifier of a seat, unique across buses
    SeatId
);
id_type!(
    /// Identifier of a booking
    BookingId
);
id_type!(
    /// Identifier of a user account
    UserId
);

/// A scheduled bus with its seat inventory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    /// Bus identifier
    pub id: BusId,
    /// Display name
    #[serde(rename = "bus_name")]
    pub name: String,
    /// Registration or service number
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    /// Departure city
    pub origin: String,
    /// Arrival city
    pub destination: String,
    /// Scheduled departure, as sent by the server
    pub start_time: String,
    /// Scheduled arrival, as sent by the server
    pub reach_time: String,
    /// Seats in display order (absent in some list responses)
    #[serde(default)]
    pub seats: Vec<Seat>,
}

/// A bookable seat on a bus
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Seat identifier
    pub id: SeatId,
    /// Label shown to the user ("A1", "12")
    #[serde(deserialize_with = "string_or_number")]
    pub seat_number: String,
    /// Server-side booked flag
    #[serde(default)]
    pub is_booked: bool,
}

/// A reference the server may send either as a bare id or as an expanded object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Related<T> {
    /// Only the primary key
    Id(u64),
    /// The nested object
    Expanded(T),
}

impl<T> Related<T> {
    /// The expanded object, if the server sent one
    #[must_use]
    pub const fn expanded(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Expanded(value) => Some(value),
        }
    }
}

/// The parts of a bus embedded in a booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusSummary {
    /// Bus identifier
    #[serde(default)]
    pub id: Option<BusId>,
    /// Display name
    #[serde(default)]
    pub bus_name: Option<String>,
    /// Registration or service number
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub number: Option<String>,
}

/// The parts of a seat embedded in a booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    /// Seat identifier
    #[serde(default)]
    pub id: Option<SeatId>,
    /// Seat label
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub seat_number: Option<String>,
}

/// The parts of a user embedded in a booking
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User identifier
    #[serde(default)]
    pub id: Option<UserId>,
    /// Account name
    #[serde(default)]
    pub username: Option<String>,
}

/// Ticket price, kept as the server formatted it
///
/// Decimal fields arrive as strings (`"450.00"`) from some serializers and as
/// numbers from others.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    /// Wrap a formatted price
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The price as displayed
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_number(deserializer).map(Self)
    }
}

/// A booking created by the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking identifier
    pub id: BookingId,
    /// Owning user
    #[serde(default)]
    pub user: Option<Related<UserSummary>>,
    /// Booked bus
    #[serde(default)]
    pub bus: Option<Related<BusSummary>>,
    /// Booked seat
    #[serde(default)]
    pub seat: Option<Related<SeatSummary>>,
    /// Departure city
    #[serde(default)]
    pub origin: Option<String>,
    /// Arrival city
    #[serde(default)]
    pub destination: Option<String>,
    /// Price paid
    #[serde(default)]
    pub price: Option<Price>,
    /// When the booking was made
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub booking_time: Option<DateTime<Utc>>,
}

/// Body returned by a successful booking request
///
/// The server echoes the created booking; every field is optional so an
/// empty or partial body still counts as a confirmation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    /// Created booking
    #[serde(default)]
    pub id: Option<BookingId>,
    /// Booked seat
    #[serde(default)]
    pub seat: Option<Related<SeatSummary>>,
    /// Price charged
    #[serde(default)]
    pub price: Option<Price>,
    /// Server timestamp
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub booking_time: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub(crate) struct BookingRequest {
    pub(crate) seat: SeatId,
}

/// Login form
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Account name
    pub username: String,
    /// Plain password, sent once over the wire
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Opaque authentication token issued by the server
///
/// Never printed: `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token string
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for the `Authorization` header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Body returned by a successful login
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Token for authenticated requests
    pub token: AuthToken,
    /// Account the token belongs to
    pub user_id: UserId,
}

/// Registration form
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Desired account name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Desired password
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Validation errors keyed by form field
///
/// Each field maps to a list of messages, or occasionally a single string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, serde_json::Value>);

impl FieldErrors {
    /// First message reported for `field`
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        match self.0.get(field)? {
            serde_json::Value::String(message) => Some(message),
            serde_json::Value::Array(messages) => messages.iter().find_map(|m| m.as_str()),
            _ => None,
        }
    }

    /// Fields that carry errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// True when no field carries an error
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for field in self.fields() {
            if let Some(message) = self.first(field) {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StringOrNumber>::deserialize(deserializer).map(|value| value.map(String::from))
}

/// Parse a server timestamp, with or without an offset
///
/// Timestamps without an offset are read as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

// Unreadable timestamps become absent instead of failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_str).and_then(parse_timestamp))
}
