//! Filter properties over generated fleets.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use busway::features::bus_list::{filter_buses, BusFilters};
use busway_testing::properties::{city, fleet};
use proptest::prelude::*;

proptest! {
    #[test]
    fn route_filter_keeps_exactly_the_matching_buses(
        buses in fleet(),
        origin in city(),
        destination in city(),
    ) {
        let filters = BusFilters {
            origin: origin.clone(),
            destination: destination.clone(),
            ..BusFilters::default()
        };

        let kept = filter_buses(&buses, &filters);
        let expected = buses
            .iter()
            .filter(|bus| {
                bus.origin.eq_ignore_ascii_case(&origin)
                    && bus.destination.eq_ignore_ascii_case(&destination)
            })
            .count();

        prop_assert_eq!(kept.len(), expected);
        for bus in kept {
            prop_assert!(bus.origin.eq_ignore_ascii_case(&origin));
            prop_assert!(bus.destination.eq_ignore_ascii_case(&destination));
        }
    }

    #[test]
    fn empty_filters_keep_the_whole_list_in_order(buses in fleet()) {
        let kept: Vec<_> = filter_buses(&buses, &BusFilters::default())
            .into_iter()
            .map(|bus| bus.id)
            .collect();
        let all: Vec<_> = buses.iter().map(|bus| bus.id).collect();

        prop_assert_eq!(kept, all);
    }

    #[test]
    fn search_by_exact_number_finds_the_bus(buses in fleet(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!buses.is_empty());
        let target = &buses[pick.index(buses.len())];
        let filters = BusFilters {
            search: target.number.to_lowercase(),
            ..BusFilters::default()
        };

        let kept = filter_buses(&buses, &filters);
        prop_assert!(kept.iter().any(|bus| bus.id == target.id));
    }
}
