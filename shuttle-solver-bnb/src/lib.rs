//! Parallel branch-and-bound engine for the shuttle pickup planner.
//!
//! [`BranchAndBoundEngine`] implements [`SearchEngine`](shuttle_core::SearchEngine)
//! by branching over guests in arrival order. A trip's departure is always
//! its latest rider's arrival, so a partial plan has an exact cost for every
//! trip that can no longer grow and a tight lower bound for the rest. Workers
//! run on scoped threads, share one incumbent, and stop at the wall-clock
//! budget; a worker that exhausts its tree proves the incumbent optimal.
//!
//! [`BranchAndBoundSolver`] wraps the engine in a
//! [`Planner`](shuttle_core::Planner) and is the default
//! [`Solver`](shuttle_core::Solver).

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod engine;
mod incumbent;
mod search;
mod solver;

pub use config::BranchAndBoundConfig;
pub use engine::BranchAndBoundEngine;
pub use solver::BranchAndBoundSolver;
