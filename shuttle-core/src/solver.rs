use crate::{SolveError, SolveReport, SolveRequest};

/// Alias for the solver error type.
pub type Error = SolveError;

/// Plan pickups for a request.
///
/// Implementations return [`Error::Validation`] for malformed input rather
/// than panicking. A request that cannot be satisfied is not an error: it
/// yields a report whose status is
/// [`ReportStatus::Infeasible`](crate::ReportStatus::Infeasible).
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait Solver: Send + Sync {
    /// Solve a request, producing a report or an error.
    fn solve(&self, request: &SolveRequest) -> Result<SolveReport, Error>;
}
