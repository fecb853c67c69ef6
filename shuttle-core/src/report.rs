//! Solve reports returned to callers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Instance, SearchStats, SearchStatus};

/// Reason attached to a proven-infeasible outcome.
pub const INFEASIBLE_REASON: &str = "No schedule satisfies constraints (max_wait too small, \
    too few vehicles, RT too large, or constraints too strict).";

/// Reason attached to a search that timed out without a plan.
pub const UNKNOWN_REASON: &str = "Time limit reached before any feasible schedule was found.";

/// Top-level outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ReportStatus {
    /// A plan was found.
    Ok,
    /// No plan is available; see [`SolveReport::reason`].
    Infeasible,
}

/// How the planner reached its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlanStatus {
    /// Proven minimal.
    Optimal,
    /// Best found within the time limit.
    Feasible,
    /// Proven impossible.
    Infeasible,
    /// Timed out without a plan.
    Unknown,
    /// No guests, so no search ran.
    Trivial,
}

impl From<SearchStatus> for PlanStatus {
    fn from(status: SearchStatus) -> Self {
        match status {
            SearchStatus::Optimal => Self::Optimal,
            SearchStatus::Feasible => Self::Feasible,
            SearchStatus::Infeasible => Self::Infeasible,
            SearchStatus::Unknown => Self::Unknown,
        }
    }
}

/// Search metadata attached to every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// How the answer was reached.
    pub search_status: PlanStatus,
    /// Objective value of the returned plan, if any.
    pub objective: Option<i64>,
    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Nodes expanded by the search engine.
    pub nodes_explored: u64,
    /// Worker threads used.
    pub workers: usize,
}

impl Diagnostics {
    /// Diagnostics for an answer that needed no search.
    #[must_use]
    pub const fn trivial() -> Self {
        Self {
            search_status: PlanStatus::Trivial,
            objective: None,
            solve_time_ms: 0,
            nodes_explored: 0,
            workers: 0,
        }
    }

    /// Diagnostics for a finished search.
    #[must_use]
    pub fn from_search(status: SearchStatus, objective: Option<i64>, stats: &SearchStats) -> Self {
        Self {
            search_status: status.into(),
            objective,
            solve_time_ms: u64::try_from(stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            nodes_explored: stats.nodes_explored,
            workers: stats.workers,
        }
    }
}

/// A guest as it appears in a trip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TripGuest {
    /// Guest identifier.
    pub guest_id: String,
    /// Display name.
    pub name: String,
    /// Arrival minute.
    pub arrival_min: i64,
    /// Minutes between arrival and departure.
    pub wait_min: i64,
}

/// One used trip.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trip {
    /// Position in departure order.
    pub trip_index: usize,
    /// Vehicle serving the trip.
    pub vehicle_index: usize,
    /// Capacity of that vehicle.
    pub vehicle_capacity: usize,
    /// Departure minute.
    pub departure_min: i64,
    /// Earliest arrival among riders.
    pub min_arrival_min: i64,
    /// Latest arrival among riders.
    pub max_arrival_min: i64,
    /// Number of riders.
    pub num_guests: usize,
    /// Riders in arrival order.
    pub guests: Vec<TripGuest>,
}

/// Full answer to a [`SolveRequest`](crate::SolveRequest).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveReport {
    /// Whether a plan is present.
    pub status: ReportStatus,
    /// Number of guests in the request.
    pub num_guests: usize,
    /// Fleet size.
    pub num_vehicles: usize,
    /// Normalised capacities.
    pub vehicle_capacities: Vec<usize>,
    /// Wait bound.
    pub max_wait_min: i64,
    /// Round-trip duration.
    pub round_trip_min: i64,
    /// Used trips.
    pub num_trips_used: usize,
    /// Sum of guest waits.
    pub total_wait_min: i64,
    /// Trips ordered by departure.
    pub trips: Vec<Trip>,
    /// Why no plan is available.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub reason: Option<String>,
    /// Search metadata.
    pub diagnostics: Diagnostics,
}

impl SolveReport {
    /// A report carrying `trips`.
    #[must_use]
    pub fn planned(
        instance: &Instance,
        trips: Vec<Trip>,
        total_wait_min: i64,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            num_trips_used: trips.len(),
            total_wait_min,
            trips,
            ..Self::header(instance, ReportStatus::Ok, None, diagnostics)
        }
    }

    /// A report with no plan.
    #[must_use]
    pub fn infeasible(
        instance: &Instance,
        reason: impl Into<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self::header(
            instance,
            ReportStatus::Infeasible,
            Some(reason.into()),
            diagnostics,
        )
    }

    /// Whether the report carries a plan.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, ReportStatus::Ok)
    }

    fn header(
        instance: &Instance,
        status: ReportStatus,
        reason: Option<String>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            status,
            num_guests: instance.num_guests(),
            num_vehicles: instance.fleet_size(),
            vehicle_capacities: instance.fleet_capacities().to_vec(),
            max_wait_min: instance.max_wait_min(),
            round_trip_min: instance.round_trip_min(),
            num_trips_used: 0,
            total_wait_min: 0,
            trips: Vec::new(),
            reason,
            diagnostics,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::{Guest, SolveRequest};
    use rstest::rstest;

    #[rstest]
    fn infeasible_report_serialises_reason_and_lowercase_status() {
        let request = SolveRequest::new(vec![Guest::new("g1", "Ada", 0)], 1, 2, 0);
        let instance = Instance::from_request(&request).expect("valid request");
        let report = SolveReport::infeasible(&instance, INFEASIBLE_REASON, Diagnostics::trivial());
        let json = serde_json::to_value(&report).expect("report serialises");
        assert_eq!(json["status"], "infeasible");
        assert_eq!(json["reason"], INFEASIBLE_REASON);
        assert_eq!(json["round_trip_min"], 240);
        assert_eq!(json["diagnostics"]["search_status"], "trivial");
    }

    #[rstest]
    fn ok_report_omits_reason() {
        let request = SolveRequest::new(Vec::new(), 2, 4, 10);
        let instance = Instance::from_request(&request).expect("valid request");
        let report = SolveReport::planned(&instance, Vec::new(), 0, Diagnostics::trivial());
        let json = serde_json::to_value(&report).expect("report serialises");
        assert_eq!(json["status"], "ok");
        assert!(json.get("reason").is_none());
        assert_eq!(json["vehicle_capacities"], serde_json::json!([4, 4]));
    }
}
