//! Core domain model for the shuttle pickup planner.
//!
//! A caller builds a [`SolveRequest`], which [`Instance::from_request`]
//! validates into an immutable [`Instance`]. The [`FormulationBuilder`]
//! turns an instance into an engine-agnostic [`Formulation`]; any
//! [`SearchEngine`] can explore it. [`Planner`] ties these stages together
//! behind the [`Solver`] trait, certifies the engine's [`Assignment`], and
//! renders it as a [`SolveReport`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod assignment;
mod engine;
mod error;
mod extract;
pub mod formulation;
mod guest;
mod instance;
mod planner;
mod report;
mod request;
mod solver;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use assignment::{Assignment, SlotPlan};
pub use engine::{
    DEFAULT_NUM_WORKERS, DEFAULT_TIME_LIMIT, Incumbent, SearchEngine, SearchLimits,
    SearchOutcome, SearchStats, SearchStatus,
};
pub use error::{SolveError, ValidationError};
pub use extract::{Extraction, extract};
pub use formulation::{Formulation, FormulationBuilder, FormulationViolation};
pub use guest::Guest;
pub use instance::{Grouping, Instance, MAX_TIME_MIN, Vehicle};
pub use planner::{Planner, PlannerConfig};
pub use report::{
    Diagnostics, INFEASIBLE_REASON, PlanStatus, ReportStatus, SolveReport, Trip, TripGuest,
    UNKNOWN_REASON,
};
pub use request::{DEFAULT_ROUND_TRIP_MIN, GroupingRule, SolveRequest};
pub use solver::{Error, Solver};
