//! Ready-made buses, seats, and bookings

use busway_api::{
    Booking, BookingId, Bus, BusId, BusSummary, Price, Related, Seat, SeatId, SeatSummary,
};
use chrono::{DateTime, Utc};

/// A Mumbai → Pune bus with the given `(seat id, label, booked)` seats
#[must_use]
pub fn bus(id: u64, seats: &[(u64, &str, bool)]) -> Bus {
    bus_on_route(id, &format!("Bus {id}"), &format!("MH{id:02}"), "Mumbai", "Pune", seats)
}

/// A bus with explicit name, number, and route
#[must_use]
pub fn bus_on_route(
    id: u64,
    name: &str,
    number: &str,
    origin: &str,
    destination: &str,
    seats: &[(u64, &str, bool)],
) -> Bus {
    Bus {
        id: BusId::new(id),
        name: name.to_string(),
        number: number.to_string(),
        origin: origin.to_string(),
        destination: destination.to_string(),
        start_time: "08:00:00".to_string(),
        reach_time: "11:30:00".to_string(),
        seats: seats
            .iter()
            .map(|&(seat_id, label, is_booked)| Seat {
                id: SeatId::new(seat_id),
                seat_number: label.to_string(),
                is_booked,
            })
            .collect(),
    }
}

/// A fully expanded booking of seat `seat_label` on `bus`
#[must_use]
pub fn booking(id: u64, user_id: u64, bus: &Bus, seat_label: &str, booked_at: DateTime<Utc>) -> Booking {
    Booking {
        id: BookingId::new(id),
        user: Some(Related::Id(user_id)),
        bus: Some(Related::Expanded(BusSummary {
            id: Some(bus.id),
            bus_name: Some(bus.name.clone()),
            number: Some(bus.number.clone()),
        })),
        seat: Some(Related::Expanded(SeatSummary {
            id: None,
            seat_number: Some(seat_label.to_string()),
        })),
        origin: Some(bus.origin.clone()),
        destination: Some(bus.destination.clone()),
        price: Some(Price::new("450.00")),
        booking_time: Some(booked_at),
    }
}

