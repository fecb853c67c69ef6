//! Parallel portfolio of branch-and-bound workers.

use std::thread;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use shuttle_core::{
    Formulation, SearchEngine, SearchLimits, SearchOutcome, SearchStats, SearchStatus,
};

use crate::BranchAndBoundConfig;
use crate::incumbent::SharedIncumbent;
use crate::search::{SearchContext, ValueOrder, Worker, WorkerReport};

/// Exact search engine that races diversified workers over one tree.
///
/// Worker 0 packs guests into existing trips first, worker 1 follows the
/// cheapest immediate move, and the rest branch in seeded random order. All
/// workers share one incumbent so each prunes with the best bound found by
/// any of them.
///
/// # Examples
/// ```
/// use shuttle_core::{
///     FormulationBuilder, Guest, Instance, SearchEngine, SearchLimits, SearchStatus, SolveRequest,
/// };
/// use shuttle_solver_bnb::BranchAndBoundEngine;
///
/// let request = SolveRequest::new(vec![Guest::new("g1", "Ana", 0)], 1, 4, 10);
/// let instance = Instance::from_request(&request).expect("valid request");
/// let formulation = FormulationBuilder::new(&instance).build();
/// let outcome = BranchAndBoundEngine::new().search(&formulation, &SearchLimits::default());
/// assert_eq!(outcome.status, SearchStatus::Optimal);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BranchAndBoundEngine {
    config: BranchAndBoundConfig,
}

impl BranchAndBoundEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with an explicit configuration.
    #[must_use]
    pub const fn with_config(config: BranchAndBoundConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &BranchAndBoundConfig {
        &self.config
    }

    const fn order_for(worker: usize) -> ValueOrder {
        match worker {
            0 => ValueOrder::JoinFirst,
            1 => ValueOrder::Cheapest,
            _ => ValueOrder::Shuffled,
        }
    }
}

impl SearchEngine for BranchAndBoundEngine {
    fn search(&self, formulation: &Formulation<'_>, limits: &SearchLimits) -> SearchOutcome {
        let started = Instant::now();
        let deadline = started.checked_add(limits.time_limit);
        let context = SearchContext::new(formulation);
        let workers = limits.num_workers.max(1);
        log::info!(
            "branch and bound: {} guests, {} vehicles, {workers} workers, limit {:?}",
            context.len(),
            context.capacities.len(),
            limits.time_limit
        );

        if context.arrivals.iter().any(|&arrival| arrival > context.horizon) {
            log::info!("branch and bound: an arrival lies beyond the horizon");
            return SearchOutcome::without_plan(
                SearchStatus::Infeasible,
                SearchStats {
                    nodes_explored: 0,
                    elapsed: started.elapsed(),
                    workers: 0,
                },
            );
        }

        let shared = SharedIncumbent::new();
        let reports: Vec<WorkerReport> = thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let seed = self
                        .config
                        .seed
                        .wrapping_add(u64::try_from(worker).unwrap_or(u64::MAX));
                    let searcher = Worker::new(
                        &context,
                        &shared,
                        deadline,
                        self.config.check_interval,
                        Self::order_for(worker),
                        ChaCha8Rng::seed_from_u64(seed),
                    );
                    scope.spawn(move || searcher.run())
                })
                .collect();
            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .collect()
        });

        let exhausted = shared.is_exhausted();
        let best = shared.into_best();
        let status = match (exhausted, best.is_some()) {
            (true, true) => SearchStatus::Optimal,
            (true, false) => SearchStatus::Infeasible,
            (false, true) => SearchStatus::Feasible,
            (false, false) => SearchStatus::Unknown,
        };
        let stats = SearchStats {
            nodes_explored: reports.iter().map(|report| report.nodes).sum(),
            elapsed: started.elapsed(),
            workers,
        };
        log::info!(
            "branch and bound: {} after {} nodes in {:?}, objective {:?}",
            status.as_str(),
            stats.nodes_explored,
            stats.elapsed,
            best.as_ref().map(|incumbent| incumbent.objective)
        );
        SearchOutcome {
            status,
            best,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::rstest;
    use shuttle_core::test_support::guests_at;
    use shuttle_core::{FormulationBuilder, Instance, SolveRequest};
    use std::time::Duration;

    fn search(request: &SolveRequest, workers: usize) -> SearchOutcome {
        let instance = Instance::from_request(request).expect("valid request");
        let formulation = FormulationBuilder::new(&instance).build();
        let limits = SearchLimits {
            time_limit: Duration::from_secs(10),
            num_workers: workers,
        };
        let outcome = BranchAndBoundEngine::new().search(&formulation, &limits);
        if let Some(best) = &outcome.best {
            let (objective, _) = formulation
                .certify(&best.assignment)
                .expect("engine assignments are certified");
            assert_eq!(objective, best.objective);
        }
        outcome
    }

    #[rstest]
    #[case(1)]
    #[case(4)]
    fn proves_single_trip_optimal(#[case] workers: usize) {
        let request = SolveRequest::new(guests_at(&[0, 10, 15]), 1, 3, 20);
        let outcome = search(&request, workers);
        assert_eq!(outcome.status, SearchStatus::Optimal);
        assert_eq!(outcome.best.map(|best| best.objective), Some(21));
        assert_eq!(outcome.stats.workers, workers);
    }

    #[rstest]
    fn splits_when_wait_bound_is_tight() {
        let request = SolveRequest::new(guests_at(&[0, 10, 15]), 2, 3, 5);
        let outcome = search(&request, 2);
        assert_eq!(outcome.status, SearchStatus::Optimal);
        // {0} and {10, 15}: wait 5, two trips.
        assert_eq!(outcome.best.map(|best| best.objective), Some(7));
    }

    #[rstest]
    fn reports_infeasible_when_one_vehicle_cannot_return() {
        let request = SolveRequest::new(guests_at(&[0, 10, 15]), 1, 3, 5).with_round_trip_min(60);
        let outcome = search(&request, 3);
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert!(outcome.best.is_none());
    }

    #[rstest]
    fn reports_infeasible_past_the_horizon() {
        let request = SolveRequest::new(guests_at(&[0, 50]), 1, 2, 60).with_time_horizon_min(40);
        let outcome = search(&request, 1);
        assert_eq!(outcome.status, SearchStatus::Infeasible);
        assert_eq!(outcome.stats.nodes_explored, 0);
    }

    #[rstest]
    fn empty_instance_is_trivially_optimal() {
        let request = SolveRequest::new(Vec::new(), 2, 2, 0);
        let outcome = search(&request, 1);
        assert_eq!(outcome.status, SearchStatus::Optimal);
        assert_eq!(outcome.best.map(|best| best.objective), Some(0));
    }

    fn crowded_arrivals(count: usize) -> Vec<i64> {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut arrivals: Vec<i64> = (0..count).map(|_| rng.gen_range(0..240)).collect();
        arrivals.sort_unstable();
        arrivals
    }

    fn timed_engine() -> BranchAndBoundEngine {
        BranchAndBoundEngine::with_config(BranchAndBoundConfig::default().with_check_interval(1))
    }

    #[rstest]
    fn zero_budget_stops_before_any_plan() {
        let request = SolveRequest::new(guests_at(&crowded_arrivals(40)), 3, 4, 30)
            .with_round_trip_min(0);
        let instance = Instance::from_request(&request).expect("valid request");
        let formulation = FormulationBuilder::new(&instance).build();
        let limits = SearchLimits {
            time_limit: Duration::ZERO,
            num_workers: 2,
        };
        let outcome = timed_engine().search(&formulation, &limits);
        assert_eq!(outcome.status, SearchStatus::Unknown);
        assert!(outcome.best.is_none());
    }

    #[rstest]
    fn deadline_returns_a_certified_incumbent() {
        let request = SolveRequest::new(guests_at(&crowded_arrivals(200)), 3, 4, 30)
            .with_round_trip_min(0);
        let instance = Instance::from_request(&request).expect("valid request");
        let formulation = FormulationBuilder::new(&instance).build();
        let limit = Duration::from_millis(200);
        let limits = SearchLimits {
            time_limit: limit,
            num_workers: 2,
        };
        let outcome = timed_engine().search(&formulation, &limits);

        assert_eq!(outcome.status, SearchStatus::Feasible);
        let best = outcome.best.expect("an incumbent survives the deadline");
        let (objective, _) = formulation
            .certify(&best.assignment)
            .expect("incumbent is certified");
        assert_eq!(objective, best.objective);
        assert!(outcome.stats.elapsed >= limit);
        assert!(outcome.stats.elapsed < limit + Duration::from_secs(2));
        assert!(outcome.stats.nodes_explored > 0);
    }

    #[rstest]
    fn worker_orders_cover_the_portfolio() {
        assert_eq!(BranchAndBoundEngine::order_for(0), ValueOrder::JoinFirst);
        assert_eq!(BranchAndBoundEngine::order_for(1), ValueOrder::Cheapest);
        assert_eq!(BranchAndBoundEngine::order_for(7), ValueOrder::Shuffled);
    }
}
