//! Proptest strategies and an exhaustive reference solver for property tests.
//!
//! [`reference_optimum`] enumerates every partition of the guests into trips
//! and every placement of those trips on vehicles. It shares no code with the
//! branch-and-bound search, so agreeing with it is meaningful.

use proptest::prelude::*;
use shuttle_core::test_support::guests_at;
use shuttle_core::{GroupingRule, Instance, SolveRequest, ValidationError};

/// Strategy for small valid requests with at most `max_guests` guests.
///
/// Arrivals fall within an hour so trips interact through both the wait
/// bound and the round trip. About half of the requests carry an
/// incompatible pair and about half a grouping rule.
pub fn request_strategy(max_guests: usize) -> impl Strategy<Value = SolveRequest> {
    (
        proptest::collection::vec(0_i64..60, 1..=max_guests),
        1_u32..=3,
        1_i64..=3,
        0_i64..=20,
        prop_oneof![Just(0_i64), Just(15), Just(30), Just(60)],
    )
        .prop_flat_map(|(arrivals, cars, seats, max_wait, round_trip)| {
            let count = arrivals.len();
            (
                Just(arrivals),
                Just(cars),
                Just(seats),
                Just(max_wait),
                Just(round_trip),
                proptest::option::of((0..count, 0..count)),
                proptest::option::of((0..count, 0..count, 0..i64::from(cars))),
            )
        })
        .prop_map(
            |(arrivals, cars, seats, max_wait, round_trip, incompatible, grouping)| {
                let mut request = SolveRequest::new(guests_at(&arrivals), cars, seats, max_wait)
                    .with_round_trip_min(round_trip);
                if let Some((a, b)) = incompatible {
                    request = request.with_incompatible_pair(guest_id(a), guest_id(b));
                }
                if let Some((a, b, vehicle)) = grouping {
                    request =
                        request.with_grouping(GroupingRule::new(guest_id(a), guest_id(b), vehicle));
                }
                request
            },
        )
}

/// The same request with its guest list shuffled.
pub fn shuffled(request: SolveRequest) -> impl Strategy<Value = (SolveRequest, SolveRequest)> {
    Just(request.guests.clone())
        .prop_shuffle()
        .prop_map(move |guests| {
            let mut permuted = request.clone();
            permuted.guests = guests;
            (request.clone(), permuted)
        })
}

fn guest_id(index: usize) -> String {
    format!("g{}", index + 1)
}

/// Largest guest count [`reference_optimum`] accepts.
pub const REFERENCE_LIMIT: usize = 7;

/// Compute the optimal objective of a small request by enumeration.
///
/// Returns `Ok(None)` when no plan exists. The objective is total wait plus
/// `trip_penalty` per trip.
///
/// # Errors
/// Returns the [`ValidationError`] the request fails with.
///
/// # Panics
/// Panics if the request has more than [`REFERENCE_LIMIT`] guests.
pub fn reference_optimum(
    request: &SolveRequest,
    trip_penalty: i64,
) -> Result<Option<i64>, ValidationError> {
    let instance = Instance::from_request(request)?;
    assert!(
        instance.num_guests() <= REFERENCE_LIMIT,
        "reference enumeration is limited to {REFERENCE_LIMIT} guests"
    );
    let mut reference = Reference {
        instance: &instance,
        trip_penalty,
        blocks: Vec::new(),
        best: None,
    };
    reference.partition(0);
    Ok(reference.best)
}

struct Reference<'a> {
    instance: &'a Instance,
    trip_penalty: i64,
    blocks: Vec<Vec<usize>>,
    best: Option<i64>,
}

struct Block {
    size: usize,
    departure: i64,
    pinned: Option<usize>,
}

#[expect(
    clippy::indexing_slicing,
    reason = "block and vehicle indices come from the enumeration itself"
)]
impl Reference<'_> {
    fn partition(&mut self, guest: usize) {
        if guest == self.instance.num_guests() {
            self.evaluate();
            return;
        }
        for block in 0..self.blocks.len() {
            self.blocks[block].push(guest);
            self.partition(guest + 1);
            self.blocks[block].pop();
        }
        self.blocks.push(vec![guest]);
        self.partition(guest + 1);
        self.blocks.pop();
    }

    fn evaluate(&mut self) {
        let instance = self.instance;
        let mut wait = 0;
        let mut blocks = Vec::with_capacity(self.blocks.len());
        for members in &self.blocks {
            let arrivals: Vec<i64> = members.iter().filter_map(|&g| instance.arrival(g)).collect();
            let (Some(&earliest), Some(&latest)) = (arrivals.iter().min(), arrivals.iter().max())
            else {
                return;
            };
            if latest - earliest > instance.max_wait_min() || latest > instance.horizon_min() {
                return;
            }
            let clash = members.iter().enumerate().any(|(i, &a)| {
                members[i + 1..]
                    .iter()
                    .any(|&b| instance.are_incompatible(a, b))
            });
            if clash {
                return;
            }
            let pinned = instance.grouping().and_then(|grouping| {
                let has_first = members.contains(&grouping.first);
                let has_second = members.contains(&grouping.second);
                (has_first || has_second).then_some((has_first && has_second, grouping.vehicle))
            });
            if pinned.is_some_and(|(together, _)| !together) {
                return;
            }
            wait += arrivals.iter().map(|a| latest - a).sum::<i64>();
            blocks.push(Block {
                size: members.len(),
                departure: latest,
                pinned: pinned.map(|(_, vehicle)| vehicle),
            });
        }

        let objective = wait + self.trip_penalty * i64::try_from(blocks.len()).unwrap_or(i64::MAX);
        if self.best.is_some_and(|best| best <= objective) {
            return;
        }
        let mut per_vehicle = vec![Vec::new(); instance.num_vehicles()];
        if self.place(&blocks, 0, &mut per_vehicle) {
            self.best = Some(objective);
        }
    }

    fn place(&self, blocks: &[Block], next: usize, per_vehicle: &mut [Vec<i64>]) -> bool {
        let Some(block) = blocks.get(next) else {
            return true;
        };
        let round_trip = self.instance.round_trip_min();
        for vehicle in 0..per_vehicle.len() {
            if block.pinned.is_some_and(|pinned| pinned != vehicle)
                || self.instance.capacity(vehicle).unwrap_or(0) < block.size
                || per_vehicle[vehicle]
                    .iter()
                    .any(|&other: &i64| (other - block.departure).abs() < round_trip)
            {
                continue;
            }
            per_vehicle[vehicle].push(block.departure);
            let placed = self.place(blocks, next + 1, per_vehicle);
            per_vehicle[vehicle].pop();
            if placed {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn single_vehicle_gathers_everyone() {
        let request = SolveRequest::new(guests_at(&[0, 10]), 1, 2, 10);
        assert_eq!(reference_optimum(&request, 1), Ok(Some(11)));
    }

    #[rstest]
    fn overlapping_trips_are_infeasible() {
        let request = SolveRequest::new(guests_at(&[0, 30]), 1, 4, 10).with_round_trip_min(45);
        assert_eq!(reference_optimum(&request, 1), Ok(None));
    }

    #[rstest]
    fn grouping_is_enforced() {
        // Without the rule g1 and g2 would share a trip for a cost of 2.
        let request = SolveRequest::new(guests_at(&[0, 0, 5]), 2, 2, 5)
            .with_incompatible_pair("g2", "g3")
            .with_grouping(GroupingRule::new("g1", "g3", 0));
        assert_eq!(reference_optimum(&request, 1), Ok(Some(7)));
    }

    #[rstest]
    fn validation_errors_surface() {
        let request = SolveRequest::new(guests_at(&[0]), 0, 1, 0);
        assert_eq!(
            reference_optimum(&request, 1),
            Err(ValidationError::NoVehicles)
        );
    }
}
