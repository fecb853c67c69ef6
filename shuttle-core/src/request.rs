//! Raw solve requests as supplied by callers.
//!
//! A [`SolveRequest`] is deliberately permissive: capacities and times are
//! plain signed integers so that out-of-range values surface as a
//! [`ValidationError`](crate::ValidationError) from
//! [`Instance::from_request`](crate::Instance::from_request) rather than as a
//! decoding failure.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Guest;

/// Round-trip duration applied when a request leaves it unset.
pub const DEFAULT_ROUND_TRIP_MIN: i64 = 240;

/// Two guests that must ride together in one named vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GroupingRule {
    /// First guest of the pair.
    pub guest_id_a: String,
    /// Second guest of the pair.
    pub guest_id_b: String,
    /// Index of the vehicle that must serve their trip.
    pub vehicle_index: i64,
}

impl GroupingRule {
    /// Construct a grouping rule.
    #[must_use]
    pub fn new(
        guest_id_a: impl Into<String>,
        guest_id_b: impl Into<String>,
        vehicle_index: i64,
    ) -> Self {
        Self {
            guest_id_a: guest_id_a.into(),
            guest_id_b: guest_id_b.into(),
            vehicle_index,
        }
    }
}

/// Parameters for a pickup planning request.
///
/// # Examples
/// ```rust
/// use shuttle_core::{Guest, SolveRequest};
///
/// let request = SolveRequest::new(vec![Guest::new("g1", "Ada", 0)], 1, 3, 15)
///     .with_round_trip_min(60);
/// assert_eq!(request.round_trip_min(), 60);
/// assert!(request.incompatible_pairs.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveRequest {
    /// Guests to transport, in caller order.
    pub guests: Vec<Guest>,
    /// Number of vehicles in the fleet.
    pub num_cars: u32,
    /// Default capacity used for vehicles without an explicit capacity.
    pub capacity_per_car: i64,
    /// Maximum spread between the first and last arrival on one trip.
    pub max_wait_min: i64,
    /// Time a vehicle is unavailable after each departure.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub round_trip_min: Option<i64>,
    /// Per-vehicle capacities, padded or truncated to `num_cars`.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub vehicle_capacities: Option<Vec<i64>>,
    /// Guest pairs that must never share a trip.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub incompatible_pairs: Option<Vec<(String, String)>>,
    /// Optional rule forcing two guests into one trip on a named vehicle.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub must_ride_together_in_vehicle: Option<GroupingRule>,
    /// Latest minute a trip may depart; derived from the arrivals when unset.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub time_horizon_min: Option<i64>,
}

impl SolveRequest {
    /// Construct a request with no optional constraints.
    #[must_use]
    pub const fn new(
        guests: Vec<Guest>,
        num_cars: u32,
        capacity_per_car: i64,
        max_wait_min: i64,
    ) -> Self {
        Self {
            guests,
            num_cars,
            capacity_per_car,
            max_wait_min,
            round_trip_min: None,
            vehicle_capacities: None,
            incompatible_pairs: None,
            must_ride_together_in_vehicle: None,
            time_horizon_min: None,
        }
    }

    /// Set the round-trip duration.
    #[must_use]
    pub const fn with_round_trip_min(mut self, minutes: i64) -> Self {
        self.round_trip_min = Some(minutes);
        self
    }

    /// Set explicit per-vehicle capacities.
    #[must_use]
    pub fn with_vehicle_capacities(mut self, capacities: Vec<i64>) -> Self {
        self.vehicle_capacities = Some(capacities);
        self
    }

    /// Add a pair of guests that must not share a trip.
    #[must_use]
    pub fn with_incompatible_pair(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.incompatible_pairs
            .get_or_insert_with(Vec::new)
            .push((a.into(), b.into()));
        self
    }

    /// Set the grouping rule.
    #[must_use]
    pub fn with_grouping(mut self, rule: GroupingRule) -> Self {
        self.must_ride_together_in_vehicle = Some(rule);
        self
    }

    /// Set an explicit time horizon.
    #[must_use]
    pub const fn with_time_horizon_min(mut self, minutes: i64) -> Self {
        self.time_horizon_min = Some(minutes);
        self
    }

    /// Round-trip duration, falling back to [`DEFAULT_ROUND_TRIP_MIN`].
    #[must_use]
    pub fn round_trip_min(&self) -> i64 {
        self.round_trip_min.unwrap_or(DEFAULT_ROUND_TRIP_MIN)
    }
}
