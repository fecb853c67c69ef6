//! Errors raised while building and solving an instance.

use thiserror::Error;

/// Errors returned by [`Instance::from_request`](crate::Instance::from_request).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request asked for zero vehicles.
    #[error("num_cars must be at least 1")]
    NoVehicles,
    /// A normalised vehicle capacity was below one.
    #[error("vehicle_capacities must be >= 1 (vehicle {index} has capacity {capacity})")]
    InvalidCapacity {
        /// Vehicle index after normalisation.
        index: usize,
        /// Offending capacity.
        capacity: i64,
    },
    /// The wait bound was negative.
    #[error("max_wait_min must be non-negative, got {max_wait_min}")]
    NegativeMaxWait {
        /// Offending value.
        max_wait_min: i64,
    },
    /// The round-trip duration was negative.
    #[error("round_trip_min must be non-negative, got {round_trip_min}")]
    NegativeRoundTrip {
        /// Offending value.
        round_trip_min: i64,
    },
    /// A minute value lies outside ±[`MAX_TIME_MIN`](crate::MAX_TIME_MIN).
    #[error("{field} must lie within ±{limit} minutes, got {value}")]
    TimeOutOfRange {
        /// Request field holding the value.
        field: &'static str,
        /// Offending value.
        value: i64,
        /// Accepted magnitude.
        limit: i64,
    },
    /// Two guests share an identifier.
    #[error("guest id {guest_id:?} appears more than once")]
    DuplicateGuestId {
        /// The repeated identifier.
        guest_id: String,
    },
    /// The grouping rule names a guest that is not in the request.
    #[error("must_ride_together_in_vehicle guest id {guest_id:?} not found")]
    UnknownGroupedGuest {
        /// The unknown identifier.
        guest_id: String,
    },
    /// The grouping rule names a vehicle outside the fleet.
    #[error("vehicle_index {vehicle_index} out of range for {num_vehicles} vehicles")]
    GroupingVehicleOutOfRange {
        /// Requested vehicle index.
        vehicle_index: i64,
        /// Fleet size.
        num_vehicles: usize,
    },
}

/// Errors returned by [`Solver::solve`](crate::Solver::solve).
///
/// Infeasible or timed-out searches are not errors; they are reported through
/// [`SolveReport::status`](crate::SolveReport::status).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The search engine returned an assignment that breaks the formulation.
    #[error("search engine returned an inconsistent solution: {detail}")]
    InconsistentSolution {
        /// Description of the broken constraint or mismatch.
        detail: String,
    },
    /// The planner configuration was rejected.
    #[error("invalid planner configuration: {detail}")]
    InvalidConfig {
        /// Description of the rejected setting.
        detail: String,
    },
}
