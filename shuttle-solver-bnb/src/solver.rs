//! `BranchAndBoundSolver`, the default [`Solver`] for shuttle requests.

use shuttle_core::{Planner, PlannerConfig, SolveError, SolveReport, SolveRequest, Solver};

use crate::{BranchAndBoundConfig, BranchAndBoundEngine};

/// Planner pipeline driven by the parallel branch-and-bound engine.
///
/// # Examples
/// ```
/// use shuttle_core::{Guest, SolveRequest, Solver};
/// use shuttle_solver_bnb::BranchAndBoundSolver;
///
/// let request = SolveRequest::new(
///     vec![Guest::new("g1", "Ana", 0), Guest::new("g2", "Ben", 10)],
///     1,
///     4,
///     15,
/// );
/// let report = BranchAndBoundSolver::new().solve(&request).expect("valid request");
/// assert!(report.is_ok());
/// assert_eq!(report.num_trips_used, 1);
/// assert_eq!(report.total_wait_min, 10);
/// ```
#[derive(Debug, Clone)]
pub struct BranchAndBoundSolver {
    planner: Planner<BranchAndBoundEngine>,
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BranchAndBoundSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default(), BranchAndBoundConfig::default())
    }

    /// Construct a solver with explicit planner and engine configuration.
    #[must_use]
    pub fn with_config(planner: PlannerConfig, engine: BranchAndBoundConfig) -> Self {
        Self {
            planner: Planner::with_config(BranchAndBoundEngine::with_config(engine), planner),
        }
    }

    /// Planner settings in effect.
    #[must_use]
    pub const fn planner_config(&self) -> &PlannerConfig {
        self.planner.config()
    }

    /// Engine settings in effect.
    #[must_use]
    pub const fn engine_config(&self) -> &BranchAndBoundConfig {
        self.planner.engine().config()
    }
}

impl Solver for BranchAndBoundSolver {
    fn solve(&self, request: &SolveRequest) -> Result<SolveReport, SolveError> {
        self.planner.solve(request)
    }
}
