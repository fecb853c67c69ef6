//! Turn a certified [`Assignment`] into report trips.

use crate::{Assignment, Instance, SolveError, Trip, TripGuest};

/// Trips reconstructed from an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Trips ordered by `(departure_min, vehicle_index)`.
    pub trips: Vec<Trip>,
    /// Sum of every rider's wait.
    pub total_wait_min: i64,
}

/// Rebuild per-trip detail from `assignment`.
///
/// `expected_wait` is the wait term the formulation reported for the same
/// assignment; the recomputed total must match it exactly.
///
/// # Errors
/// Returns [`SolveError::InconsistentSolution`] if a guest points at a slot
/// without a plan, a plan names an unknown vehicle, or the totals disagree.
pub fn extract(
    instance: &Instance,
    assignment: &Assignment,
    expected_wait: i64,
) -> Result<Extraction, SolveError> {
    let mut trips = Vec::with_capacity(assignment.used_slots());
    for (slot, plan) in assignment.slots().iter().enumerate() {
        let Some(plan) = plan else { continue };
        let (Some(capacity), Some(vehicle_index)) = (
            instance.capacity(plan.vehicle),
            instance.fleet_index(plan.vehicle),
        ) else {
            return Err(inconsistent(format!(
                "slot {slot} uses unknown vehicle {}",
                plan.vehicle
            )));
        };

        let mut guests: Vec<TripGuest> = assignment
            .members(slot)
            .filter_map(|index| instance.guest(index))
            .map(|guest| TripGuest {
                guest_id: guest.guest_id.clone(),
                name: guest.name.clone(),
                arrival_min: guest.arrival_min,
                wait_min: plan.departure_min - guest.arrival_min,
            })
            .collect();
        guests.sort_by(|a, b| {
            a.arrival_min
                .cmp(&b.arrival_min)
                .then_with(|| a.guest_id.cmp(&b.guest_id))
        });
        let (Some(first), Some(last)) = (guests.first(), guests.last()) else {
            return Err(inconsistent(format!("slot {slot} has a plan but no riders")));
        };

        trips.push(Trip {
            trip_index: 0,
            vehicle_index,
            vehicle_capacity: capacity,
            departure_min: plan.departure_min,
            min_arrival_min: first.arrival_min,
            max_arrival_min: last.arrival_min,
            num_guests: guests.len(),
            guests,
        });
    }

    for (guest, &slot) in assignment.guest_slots().iter().enumerate() {
        if assignment.plan(slot).is_none() {
            return Err(inconsistent(format!("guest {guest} rides unplanned slot {slot}")));
        }
    }

    trips.sort_by_key(|trip| (trip.departure_min, trip.vehicle_index));
    for (index, trip) in trips.iter_mut().enumerate() {
        trip.trip_index = index;
    }

    let total_wait_min = trips
        .iter()
        .flat_map(|trip| trip.guests.iter())
        .map(|guest| guest.wait_min)
        .sum();
    if total_wait_min != expected_wait {
        return Err(inconsistent(format!(
            "total wait {total_wait_min} differs from objective wait term {expected_wait}"
        )));
    }

    Ok(Extraction {
        trips,
        total_wait_min,
    })
}

fn inconsistent(detail: String) -> SolveError {
    SolveError::InconsistentSolution { detail }
}
