//! Validated problem instances.
//!
//! [`Instance::from_request`] normalises a raw [`SolveRequest`] into the
//! immutable snapshot shared by the formulation builder, the search engine,
//! and the extractor. Guests keep their request order; every other structure
//! refers to them by that index.

use std::collections::{BTreeSet, HashMap};

use crate::{Guest, SolveRequest, ValidationError};

/// Largest magnitude accepted for any minute value in a request.
///
/// Roughly four thousand years. Keeping every time within this range lets
/// horizons, departures, and weighted waits be summed in `i64` without
/// overflow.
pub const MAX_TIME_MIN: i64 = 1 << 31;

/// A vehicle the planner may dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle {
    /// Index in the requested fleet, as reported back to callers.
    pub index: usize,
    /// Maximum number of guests per trip.
    pub capacity: usize,
}

/// A resolved grouping rule: two guests pinned to one trip on one vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouping {
    /// Index of the first named guest.
    pub first: usize,
    /// Index of the second named guest. May equal `first`.
    pub second: usize,
    /// Position in [`Instance::vehicles`] of the vehicle that must serve
    /// their trip.
    pub vehicle: usize,
}

/// Immutable, validated scheduling problem.
///
/// Vehicles with equal capacity are interchangeable, capacities above the
/// guest count `N` behave alike, and no plan uses more vehicles than there
/// are guests. The instance therefore dispatches only the first `max(1, N)`
/// vehicles of each effective capacity `min(capacity, max(1, N))`, plus the
/// grouping vehicle; [`Instance::fleet_capacities`] still describes the
/// whole fleet.
///
/// # Examples
/// ```
/// use shuttle_core::{Guest, Instance, SolveRequest};
///
/// # fn main() -> Result<(), shuttle_core::ValidationError> {
/// let request = SolveRequest::new(
///     vec![Guest::new("g1", "Ada", 0), Guest::new("g2", "Bo", 10)],
///     2,
///     3,
///     15,
/// )
/// .with_round_trip_min(60)
/// .with_vehicle_capacities(vec![5]);
/// let instance = Instance::from_request(&request)?;
/// assert_eq!(instance.capacities(), vec![5, 3]);
/// assert_eq!(instance.fleet_size(), 2);
/// assert_eq!(instance.horizon_min(), 10 + 15 + 60);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    guests: Vec<Guest>,
    fleet: Vec<usize>,
    vehicles: Vec<Vehicle>,
    max_wait_min: i64,
    round_trip_min: i64,
    horizon_min: i64,
    incompatible: BTreeSet<(usize, usize)>,
    grouping: Option<Grouping>,
}

impl Instance {
    /// Validate and normalise a request.
    ///
    /// Capacities are padded with `capacity_per_car` or truncated to exactly
    /// `num_cars` entries before being checked. Incompatible pairs naming
    /// unknown guests are skipped; an unknown id in the grouping rule is an
    /// error.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] describing the first rejected field.
    pub fn from_request(request: &SolveRequest) -> Result<Self, ValidationError> {
        let num_vehicles = usize::try_from(request.num_cars).unwrap_or(usize::MAX);
        if num_vehicles == 0 {
            return Err(ValidationError::NoVehicles);
        }
        let fleet = normalise_capacities(request, num_vehicles)?;

        if request.max_wait_min < 0 {
            return Err(ValidationError::NegativeMaxWait {
                max_wait_min: request.max_wait_min,
            });
        }
        let round_trip_min = request.round_trip_min();
        if round_trip_min < 0 {
            return Err(ValidationError::NegativeRoundTrip { round_trip_min });
        }
        check_times(request)?;

        let index = index_guests(&request.guests)?;
        let incompatible = resolve_incompatible(request, &index);
        let pinned = resolve_grouping(request, &index, num_vehicles)?;
        let vehicles = dispatchable(&fleet, request.guests.len(), pinned.map(|g| g.vehicle));
        let grouping = pinned.and_then(|rule| {
            let vehicle = vehicles.iter().position(|v| v.index == rule.vehicle)?;
            Some(Grouping { vehicle, ..rule })
        });

        let max_arrival = request
            .guests
            .iter()
            .map(|guest| guest.arrival_min)
            .max()
            .unwrap_or(0);
        let horizon_min = request
            .time_horizon_min
            .unwrap_or(max_arrival + request.max_wait_min + round_trip_min);

        log::debug!(
            "instance: {} guests, {} of {} vehicles dispatchable, horizon {}",
            request.guests.len(),
            vehicles.len(),
            fleet.len(),
            horizon_min
        );

        Ok(Self {
            guests: request.guests.clone(),
            fleet,
            vehicles,
            max_wait_min: request.max_wait_min,
            round_trip_min,
            horizon_min,
            incompatible,
            grouping,
        })
    }

    /// Guests in request order.
    #[must_use]
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    /// Guest at `index`, if any.
    #[must_use]
    pub fn guest(&self, index: usize) -> Option<&Guest> {
        self.guests.get(index)
    }

    /// Number of guests.
    #[must_use]
    pub fn num_guests(&self) -> usize {
        self.guests.len()
    }

    /// Whether there is nobody to transport.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guests.is_empty()
    }

    /// Number of trip slots available to the formulation (one per guest).
    #[must_use]
    pub fn num_slots(&self) -> usize {
        self.guests.len()
    }

    /// Dispatchable vehicles, in fleet order.
    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Number of dispatchable vehicles.
    #[must_use]
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Capacity of each dispatchable vehicle, by position.
    #[must_use]
    pub fn capacities(&self) -> Vec<usize> {
        self.vehicles.iter().map(|v| v.capacity).collect()
    }

    /// Capacity of the dispatchable vehicle at `position`, if it exists.
    #[must_use]
    pub fn capacity(&self, position: usize) -> Option<usize> {
        self.vehicles.get(position).map(|v| v.capacity)
    }

    /// Fleet index of the dispatchable vehicle at `position`.
    #[must_use]
    pub fn fleet_index(&self, position: usize) -> Option<usize> {
        self.vehicles.get(position).map(|v| v.index)
    }

    /// Number of vehicles in the requested fleet.
    #[must_use]
    pub fn fleet_size(&self) -> usize {
        self.fleet.len()
    }

    /// Normalised capacity of every vehicle in the requested fleet.
    #[must_use]
    pub fn fleet_capacities(&self) -> &[usize] {
        &self.fleet
    }

    /// Maximum arrival spread within one trip.
    #[must_use]
    pub const fn max_wait_min(&self) -> i64 {
        self.max_wait_min
    }

    /// Minutes a vehicle is unavailable after each departure.
    #[must_use]
    pub const fn round_trip_min(&self) -> i64 {
        self.round_trip_min
    }

    /// Latest permitted departure.
    #[must_use]
    pub const fn horizon_min(&self) -> i64 {
        self.horizon_min
    }

    /// Earliest arrival, or `None` for an empty instance.
    #[must_use]
    pub fn min_arrival(&self) -> Option<i64> {
        self.guests.iter().map(|g| g.arrival_min).min()
    }

    /// Latest arrival, or `None` for an empty instance.
    #[must_use]
    pub fn max_arrival(&self) -> Option<i64> {
        self.guests.iter().map(|g| g.arrival_min).max()
    }

    /// Arrival of guest `index`, if it exists.
    #[must_use]
    pub fn arrival(&self, index: usize) -> Option<i64> {
        self.guests.get(index).map(|g| g.arrival_min)
    }

    /// Resolved incompatible pairs as `(lower, higher)` guest indices.
    pub fn incompatible_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.incompatible.iter().copied()
    }

    /// Whether guests `a` and `b` may not share a trip.
    #[must_use]
    pub fn are_incompatible(&self, a: usize, b: usize) -> bool {
        self.incompatible.contains(&(a.min(b), a.max(b)))
    }

    /// The resolved grouping rule, if any.
    #[must_use]
    pub const fn grouping(&self) -> Option<Grouping> {
        self.grouping
    }
}

fn check_times(request: &SolveRequest) -> Result<(), ValidationError> {
    let in_range = |field: &'static str, value: i64| {
        if (-MAX_TIME_MIN..=MAX_TIME_MIN).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::TimeOutOfRange {
                field,
                value,
                limit: MAX_TIME_MIN,
            })
        }
    };
    in_range("max_wait_min", request.max_wait_min)?;
    in_range("round_trip_min", request.round_trip_min())?;
    if let Some(horizon) = request.time_horizon_min {
        in_range("time_horizon_min", horizon)?;
    }
    request
        .guests
        .iter()
        .try_for_each(|guest| in_range("arrival_min", guest.arrival_min))
}

fn normalise_capacities(
    request: &SolveRequest,
    num_vehicles: usize,
) -> Result<Vec<usize>, ValidationError> {
    let mut raw = request.vehicle_capacities.clone().unwrap_or_default();
    raw.resize(num_vehicles, request.capacity_per_car);
    raw.into_iter()
        .enumerate()
        .map(|(index, capacity)| match usize::try_from(capacity) {
            Ok(value) if value >= 1 => Ok(value),
            _ => Err(ValidationError::InvalidCapacity { index, capacity }),
        })
        .collect()
}

/// Keep at most `max(1, num_guests)` vehicles per effective capacity, plus
/// the pinned vehicle. Capacities above the guest count are equivalent.
fn dispatchable(fleet: &[usize], num_guests: usize, pinned: Option<usize>) -> Vec<Vehicle> {
    let quota = num_guests.max(1);
    let mut kept: HashMap<usize, usize> = HashMap::new();
    fleet
        .iter()
        .enumerate()
        .filter_map(|(index, &capacity)| {
            let count = kept.entry(capacity.min(quota)).or_insert(0);
            let keep = pinned == Some(index) || *count < quota;
            if keep && pinned != Some(index) {
                *count += 1;
            }
            keep.then_some(Vehicle { index, capacity })
        })
        .collect()
}

fn index_guests(guests: &[Guest]) -> Result<HashMap<&str, usize>, ValidationError> {
    let mut index = HashMap::with_capacity(guests.len());
    for (position, guest) in guests.iter().enumerate() {
        if index.insert(guest.guest_id.as_str(), position).is_some() {
            return Err(ValidationError::DuplicateGuestId {
                guest_id: guest.guest_id.clone(),
            });
        }
    }
    Ok(index)
}

fn resolve_incompatible(
    request: &SolveRequest,
    index: &HashMap<&str, usize>,
) -> BTreeSet<(usize, usize)> {
    let mut pairs = BTreeSet::new();
    for (a, b) in request.incompatible_pairs.iter().flatten() {
        match (index.get(a.as_str()), index.get(b.as_str())) {
            (Some(&ia), Some(&ib)) if ia != ib => {
                pairs.insert((ia.min(ib), ia.max(ib)));
            }
            (Some(_), Some(_)) => {
                log::debug!("skipping incompatible pair naming {a:?} twice");
            }
            _ => {
                log::debug!("skipping incompatible pair ({a:?}, {b:?}) with unknown guest ids");
            }
        }
    }
    pairs
}

fn resolve_grouping(
    request: &SolveRequest,
    index: &HashMap<&str, usize>,
    num_vehicles: usize,
) -> Result<Option<Grouping>, ValidationError> {
    let Some(rule) = request.must_ride_together_in_vehicle.as_ref() else {
        return Ok(None);
    };
    let lookup = |guest_id: &String| {
        index
            .get(guest_id.as_str())
            .copied()
            .ok_or_else(|| ValidationError::UnknownGroupedGuest {
                guest_id: guest_id.clone(),
            })
    };
    let first = lookup(&rule.guest_id_a)?;
    let second = lookup(&rule.guest_id_b)?;
    let vehicle = usize::try_from(rule.vehicle_index)
        .ok()
        .filter(|&k| k < num_vehicles)
        .ok_or(ValidationError::GroupingVehicleOutOfRange {
            vehicle_index: rule.vehicle_index,
            num_vehicles,
        })?;
    Ok(Some(Grouping {
        first,
        second,
        vehicle,
    }))
}
