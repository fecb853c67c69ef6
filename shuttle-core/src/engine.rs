//! The seam between the planner and a search strategy.

use std::time::Duration;

use crate::{Assignment, Formulation};

/// Wall-clock budget used when none is configured.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(15);

/// Worker count used when none is configured.
pub const DEFAULT_NUM_WORKERS: usize = 8;

/// Resource limits for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Hard wall-clock budget.
    pub time_limit: Duration,
    /// Maximum number of worker threads.
    pub num_workers: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            num_workers: DEFAULT_NUM_WORKERS,
        }
    }
}

/// Terminal state of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    /// The incumbent is proven minimal.
    Optimal,
    /// An incumbent exists but the budget ran out before a proof.
    Feasible,
    /// The search space was exhausted without a feasible assignment.
    Infeasible,
    /// The budget ran out before any feasible assignment was found.
    Unknown,
}

impl SearchStatus {
    /// Whether this status carries a plan.
    #[must_use]
    pub const fn is_solution_found(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }

    /// Lower-case label used in reports and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unknown => "unknown",
        }
    }
}

/// Best assignment found together with its objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incumbent {
    /// The assignment.
    pub assignment: Assignment,
    /// Objective value as reported by the engine.
    pub objective: i64,
}

/// Search counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes expanded across all workers.
    pub nodes_explored: u64,
    /// Wall-clock time spent searching.
    pub elapsed: Duration,
    /// Workers that took part.
    pub workers: usize,
}

/// Result of [`SearchEngine::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// Terminal state.
    pub status: SearchStatus,
    /// Best assignment, present exactly when `status` carries a plan.
    pub best: Option<Incumbent>,
    /// Counters.
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// An outcome with no incumbent.
    #[must_use]
    pub const fn without_plan(status: SearchStatus, stats: SearchStats) -> Self {
        Self {
            status,
            best: None,
            stats,
        }
    }
}

/// Strategy that explores a [`Formulation`] under [`SearchLimits`].
///
/// Implementations must be `Send + Sync` so a planner can be shared across
/// threads. They may spawn their own workers but must return once the time
/// limit has elapsed.
pub trait SearchEngine: Send + Sync {
    /// Search for a minimal assignment.
    fn search(&self, formulation: &Formulation<'_>, limits: &SearchLimits) -> SearchOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SearchStatus::Optimal, true)]
    #[case(SearchStatus::Feasible, true)]
    #[case(SearchStatus::Infeasible, false)]
    #[case(SearchStatus::Unknown, false)]
    fn only_optimal_and_feasible_carry_plans(#[case] status: SearchStatus, #[case] found: bool) {
        assert_eq!(status.is_solution_found(), found);
    }

    #[rstest]
    fn default_limits_match_reference_budget() {
        let limits = SearchLimits::default();
        assert_eq!(limits.time_limit, Duration::from_secs(15));
        assert_eq!(limits.num_workers, 8);
    }
}
