//! Orchestrates validation, formulation, search, and extraction.
//!
//! [`Planner`] is generic over the [`SearchEngine`] so the same pipeline
//! drives any strategy. Every assignment an engine returns is certified
//! against the formulation before it reaches a report.

use std::time::Duration;

use crate::{
    Diagnostics, FormulationBuilder, Instance, MAX_TIME_MIN, SearchEngine, SearchLimits,
    SearchStats, SearchStatus, SolveError, SolveReport, SolveRequest, Solver,
    extract::extract,
    formulation::DEFAULT_TRIP_PENALTY,
    report::{INFEASIBLE_REASON, UNKNOWN_REASON},
};

/// Tunables shared by every planner.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use shuttle_core::PlannerConfig;
///
/// let config = PlannerConfig::default()
///     .with_time_limit(Duration::from_secs(2))
///     .with_num_workers(1);
/// assert_eq!(config.trip_penalty, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Objective weight per used trip.
    pub trip_penalty: i64,
    /// Search budget.
    pub limits: SearchLimits,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            trip_penalty: DEFAULT_TRIP_PENALTY,
            limits: SearchLimits::default(),
        }
    }
}

impl PlannerConfig {
    /// Set the trip penalty.
    #[must_use]
    pub const fn with_trip_penalty(mut self, trip_penalty: i64) -> Self {
        self.trip_penalty = trip_penalty;
        self
    }

    /// Set the wall-clock budget.
    #[must_use]
    pub const fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.limits.time_limit = time_limit;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub const fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.limits.num_workers = num_workers;
        self
    }

    /// Reject settings no engine can honour.
    ///
    /// # Errors
    /// Returns [`SolveError::InvalidConfig`] for zero workers or a trip
    /// penalty outside `0..=MAX_TIME_MIN`.
    pub fn validate(&self) -> Result<(), SolveError> {
        if self.limits.num_workers == 0 {
            return Err(SolveError::InvalidConfig {
                detail: "num_workers must be at least 1".to_owned(),
            });
        }
        if !(0..=MAX_TIME_MIN).contains(&self.trip_penalty) {
            return Err(SolveError::InvalidConfig {
                detail: format!(
                    "trip_penalty must lie in 0..={MAX_TIME_MIN}, got {}",
                    self.trip_penalty
                ),
            });
        }
        Ok(())
    }
}

/// A [`Solver`] backed by a [`SearchEngine`].
#[derive(Debug, Clone, Default)]
pub struct Planner<E> {
    engine: E,
    config: PlannerConfig,
}

impl<E: SearchEngine> Planner<E> {
    /// Create a planner with the default configuration.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, PlannerConfig::default())
    }

    /// Create a planner with an explicit configuration.
    #[must_use]
    pub const fn with_config(engine: E, config: PlannerConfig) -> Self {
        Self { engine, config }
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }
}

impl<E: SearchEngine> Solver for Planner<E> {
    fn solve(&self, request: &SolveRequest) -> Result<SolveReport, SolveError> {
        self.config.validate()?;
        let instance = Instance::from_request(request)?;
        if instance.is_empty() {
            return Ok(SolveReport::planned(
                &instance,
                Vec::new(),
                0,
                Diagnostics::trivial(),
            ));
        }

        if let Some(cause) = obvious_infeasibility(&instance) {
            log::warn!("no plan: {cause}");
            let diagnostics =
                Diagnostics::from_search(SearchStatus::Infeasible, None, &SearchStats::default());
            return Ok(SolveReport::infeasible(
                &instance,
                INFEASIBLE_REASON,
                diagnostics,
            ));
        }

        let formulation = FormulationBuilder::new(&instance)
            .with_trip_penalty(self.config.trip_penalty)
            .build();
        let outcome = self.engine.search(&formulation, &self.config.limits);

        let best = match outcome.best {
            Some(best) if outcome.status.is_solution_found() => best,
            None if outcome.status.is_solution_found() => {
                return Err(SolveError::InconsistentSolution {
                    detail: format!("status {} without an assignment", outcome.status.as_str()),
                });
            }
            _ => {
                log::warn!(
                    "no plan: search ended {} after {} nodes",
                    outcome.status.as_str(),
                    outcome.stats.nodes_explored
                );
                let reason = if outcome.status == SearchStatus::Unknown {
                    UNKNOWN_REASON
                } else {
                    INFEASIBLE_REASON
                };
                let diagnostics = Diagnostics::from_search(outcome.status, None, &outcome.stats);
                return Ok(SolveReport::infeasible(&instance, reason, diagnostics));
            }
        };

        let (objective, wait) =
            formulation
                .certify(&best.assignment)
                .map_err(|violation| SolveError::InconsistentSolution {
                    detail: violation.to_string(),
                })?;
        if objective != best.objective {
            return Err(SolveError::InconsistentSolution {
                detail: format!(
                    "engine reported objective {} but the assignment scores {objective}",
                    best.objective
                ),
            });
        }

        let extraction = extract(&instance, &best.assignment, wait)?;
        let diagnostics = Diagnostics::from_search(outcome.status, Some(objective), &outcome.stats);
        Ok(SolveReport::planned(
            &instance,
            extraction.trips,
            extraction.total_wait_min,
            diagnostics,
        ))
    }
}

/// Conditions that rule out any plan before search starts.
fn obvious_infeasibility(instance: &Instance) -> Option<String> {
    let horizon = instance.horizon_min();
    if let Some(guest) = instance.guests().iter().find(|g| g.arrival_min > horizon) {
        return Some(format!(
            "guest {} arrives at {} after the horizon {horizon}",
            guest.guest_id, guest.arrival_min
        ));
    }
    let grouping = instance.grouping()?;
    if grouping.first == grouping.second {
        return None;
    }
    if instance.are_incompatible(grouping.first, grouping.second) {
        return Some("grouped guests are incompatible".to_owned());
    }
    let spread = instance
        .arrival(grouping.first)?
        .abs_diff(instance.arrival(grouping.second)?);
    if spread > instance.max_wait_min().unsigned_abs() {
        return Some(format!("grouped guests arrive {spread} minutes apart"));
    }
    if instance.capacity(grouping.vehicle)? < 2 {
        return Some(format!(
            "vehicle {} cannot seat both grouped guests",
            instance.fleet_index(grouping.vehicle)?
        ));
    }
    None
}
