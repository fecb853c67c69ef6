//! Helpers shared by unit, behaviour, and property tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::{Guest, Instance, ReportStatus, SolveReport, SolveRequest};

/// Guests `g1..gN` arriving at the given minutes.
#[must_use]
pub fn guests_at(arrivals: &[i64]) -> Vec<Guest> {
    arrivals
        .iter()
        .enumerate()
        .map(|(i, &arrival)| {
            let n = i + 1;
            Guest::new(format!("g{n}"), format!("Guest {n}"), arrival)
        })
        .collect()
}

/// The set of rider-id sets in a report, independent of trip order.
#[must_use]
pub fn trip_partition(report: &SolveReport) -> BTreeSet<BTreeSet<String>> {
    report
        .trips
        .iter()
        .map(|trip| trip.guests.iter().map(|g| g.guest_id.clone()).collect())
        .collect()
}

/// Assert every plan invariant of `report` against `request`.
///
/// Reports without a plan are only checked for an empty trip list.
///
/// # Panics
/// Panics when the request is invalid or any invariant is broken.
pub fn assert_plan_invariants(request: &SolveRequest, report: &SolveReport) {
    let Ok(instance) = Instance::from_request(request) else {
        panic!("request must be valid");
    };
    if report.status == ReportStatus::Infeasible {
        assert!(report.trips.is_empty(), "infeasible report carries trips");
        assert!(report.reason.is_some(), "infeasible report lacks a reason");
        return;
    }
    assert!(report.reason.is_none(), "ok report carries a reason");
    assert_eq!(report.num_trips_used, report.trips.len());

    let arrivals: BTreeMap<&str, i64> = instance
        .guests()
        .iter()
        .map(|g| (g.guest_id.as_str(), g.arrival_min))
        .collect();
    let mut trip_of: BTreeMap<&str, usize> = BTreeMap::new();
    let mut total_wait = 0;

    for (position, trip) in report.trips.iter().enumerate() {
        assert_eq!(trip.trip_index, position, "trip_index follows output order");
        assert_eq!(trip.num_guests, trip.guests.len());
        assert!(trip.num_guests >= 1, "trip {position} is empty");
        assert_eq!(
            instance.fleet_capacities().get(trip.vehicle_index),
            Some(&trip.vehicle_capacity),
            "trip {position} misreports capacity"
        );
        assert!(trip.num_guests <= trip.vehicle_capacity, "trip {position} over capacity");
        assert!(
            trip.max_arrival_min - trip.min_arrival_min <= instance.max_wait_min(),
            "trip {position} exceeds the wait bound"
        );
        assert_eq!(trip.departure_min, trip.max_arrival_min);
        let first = trip.guests.first().map(|g| g.arrival_min);
        let last = trip.guests.last().map(|g| g.arrival_min);
        assert_eq!(first, Some(trip.min_arrival_min));
        assert_eq!(last, Some(trip.max_arrival_min));
        assert!(
            trip.guests
                .windows(2)
                .all(|w| matches!(w, [a, b] if a.arrival_min <= b.arrival_min)),
            "trip {position} riders out of arrival order"
        );
        for guest in &trip.guests {
            assert_eq!(arrivals.get(guest.guest_id.as_str()), Some(&guest.arrival_min));
            assert_eq!(guest.wait_min, trip.departure_min - guest.arrival_min);
            total_wait += guest.wait_min;
            let previous = trip_of.insert(guest.guest_id.as_str(), position);
            assert!(previous.is_none(), "{} rides twice", guest.guest_id);
        }
    }
    assert_eq!(trip_of.len(), instance.num_guests(), "every guest rides once");
    assert_eq!(report.total_wait_min, total_wait);

    assert!(
        report
            .trips
            .windows(2)
            .all(|w| matches!(w, [a, b] if a.departure_min <= b.departure_min)),
        "trips out of departure order"
    );

    let round_trip = instance.round_trip_min();
    for (i, a) in report.trips.iter().enumerate() {
        for b in report.trips.iter().skip(i + 1) {
            if a.vehicle_index == b.vehicle_index && round_trip > 0 {
                assert!(
                    a.departure_min + round_trip <= b.departure_min
                        || b.departure_min + round_trip <= a.departure_min,
                    "vehicle {} runs overlapping trips",
                    a.vehicle_index
                );
            }
        }
    }

    for (a, b) in instance.incompatible_pairs() {
        let (Some(ga), Some(gb)) = (instance.guest(a), instance.guest(b)) else {
            continue;
        };
        assert_ne!(
            trip_of.get(ga.guest_id.as_str()),
            trip_of.get(gb.guest_id.as_str()),
            "{} and {} share a trip",
            ga.guest_id,
            gb.guest_id
        );
    }

    if let Some(grouping) = instance.grouping() {
        let (Some(ga), Some(gb)) = (instance.guest(grouping.first), instance.guest(grouping.second))
        else {
            panic!("grouping names unknown guests");
        };
        let trip = trip_of.get(ga.guest_id.as_str()).copied();
        assert_eq!(trip, trip_of.get(gb.guest_id.as_str()).copied());
        let vehicle = trip
            .and_then(|t| report.trips.get(t))
            .map(|t| t.vehicle_index);
        assert_eq!(
            vehicle,
            instance.fleet_index(grouping.vehicle),
            "grouped trip on wrong vehicle"
        );
    }
}
