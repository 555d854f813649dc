//! Property-based testing utilities using proptest
//!
//! Strategies generate small fleets over a fixed set of cities so that
//! filters have a realistic chance of matching, with random letter case to
//! exercise case-insensitive comparison.

use crate::fixtures::bus_on_route;
use busway_api::Bus;
use proptest::prelude::*;
use proptest::sample::select;

/// Cities routes are drawn from
pub const CITIES: &[&str] = &["Mumbai", "Pune", "Goa", "Nashik", "Nagpur"];

/// A city name in random letter case
pub fn city() -> impl Strategy<Value = String> {
    (select(CITIES), 0u8..3).prop_map(|(city, case)| match case {
        0 => city.to_string(),
        1 => city.to_uppercase(),
        _ => city.to_lowercase(),
    })
}

/// Up to a dozen buses with unique ids and random routes
pub fn fleet() -> impl Strategy<Value = Vec<Bus>> {
    prop::collection::vec(("[A-Za-z ]{1,12}", "[A-Z]{2}[0-9]{2}", city(), city()), 0..12)
        .prop_map(|rows| {
            rows.into_iter()
                .zip(1u64..)
                .map(|((name, number, origin, destination), id)| {
                    bus_on_route(id, &name, &number, &origin, &destination, &[])
                })
                .collect()
        })
}

/// One bus with 1..24 seats in random booked states
pub fn seat_map() -> impl Strategy<Value = Bus> {
    prop::collection::vec(any::<bool>(), 1..24).prop_map(|booked| {
        let labels: Vec<String> = (1..=booked.len()).map(|n| format!("S{n}")).collect();
        let seats: Vec<(u64, &str, bool)> = booked
            .iter()
            .zip(&labels)
            .zip(100u64..)
            .map(|((&is_booked, label), id)| (id, label.as_str(), is_booked))
            .collect();
        bus_on_route(1, "Prop Express", "PX01", "Mumbai", "Pune", &seats)
    })
}
