//! Facade crate for the shuttle pickup planner.
//!
//! This crate re-exports the core domain types and exposes the
//! branch-and-bound solver behind the `solver-bnb` feature flag.

#![forbid(unsafe_code)]

pub use shuttle_core::{
    Diagnostics, GroupingRule, Guest, Instance, PlanStatus, Planner, PlannerConfig, ReportStatus,
    SearchEngine, SolveError, SolveReport, SolveRequest, Solver, Trip, TripGuest, ValidationError,
};

#[cfg(feature = "solver-bnb")]
pub use shuttle_solver_bnb::{BranchAndBoundConfig, BranchAndBoundEngine, BranchAndBoundSolver};
