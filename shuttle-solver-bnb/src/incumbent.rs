//! Best solution shared between workers.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use parking_lot::Mutex;
use shuttle_core::{Assignment, Incumbent};

/// Incumbent and stop signal shared by every worker of one search.
///
/// Workers read the objective through an atomic on every bound check and
/// only take the lock when they hold a strictly better candidate.
#[derive(Debug)]
pub(crate) struct SharedIncumbent {
    best: Mutex<Option<Incumbent>>,
    best_objective: AtomicI64,
    stop: AtomicBool,
    exhausted: AtomicBool,
}

impl SharedIncumbent {
    pub(crate) fn new() -> Self {
        Self {
            best: Mutex::new(None),
            best_objective: AtomicI64::new(i64::MAX),
            stop: AtomicBool::new(false),
            exhausted: AtomicBool::new(false),
        }
    }

    /// Objective of the best known solution, or `i64::MAX`.
    pub(crate) fn peek(&self) -> i64 {
        self.best_objective.load(Ordering::Acquire)
    }

    /// Install `assignment` if `objective` beats the current best.
    ///
    /// The assignment is only materialised once the candidate has won both
    /// the lock-free and the locked comparison.
    pub(crate) fn try_update(
        &self,
        objective: i64,
        assignment: impl FnOnce() -> Assignment,
    ) -> bool {
        if objective >= self.peek() {
            return false;
        }
        let mut guard = self.best.lock();
        let locked = guard.as_ref().map_or(i64::MAX, |best| best.objective);
        if objective >= locked {
            return false;
        }
        log::debug!("new incumbent: objective {objective} (was {locked})");
        *guard = Some(Incumbent {
            assignment: assignment(),
            objective,
        });
        self.best_objective.store(objective, Ordering::Release);
        true
    }

    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub(crate) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Record that a worker finished its tree and end the search.
    pub(crate) fn mark_exhausted(&self) {
        self.exhausted.store(true, Ordering::Release);
        self.request_stop();
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted.load(Ordering::Acquire)
    }

    pub(crate) fn into_best(self) -> Option<Incumbent> {
        self.best.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::thread;

    fn empty() -> Assignment {
        Assignment::new(Vec::new(), Vec::new())
    }

    #[rstest]
    fn keeps_only_strict_improvements() {
        let shared = SharedIncumbent::new();
        assert!(shared.try_update(10, empty));
        assert!(!shared.try_update(10, empty));
        assert!(shared.try_update(7, empty));
        assert_eq!(shared.peek(), 7);
        assert_eq!(shared.into_best().map(|b| b.objective), Some(7));
    }

    #[rstest]
    fn rejected_candidates_are_never_built() {
        let shared = SharedIncumbent::new();
        assert!(shared.try_update(3, empty));
        let updated = shared.try_update(5, || panic!("should not materialise"));
        assert!(!updated);
    }

    #[rstest]
    fn concurrent_updates_converge_on_minimum() {
        let shared = SharedIncumbent::new();
        thread::scope(|scope| {
            for worker in 0..4_i64 {
                let handle = &shared;
                scope.spawn(move || {
                    for step in (0..50_i64).rev() {
                        handle.try_update(step * 4 + worker, empty);
                    }
                });
            }
        });
        assert_eq!(shared.peek(), 0);
    }

    #[rstest]
    fn exhaustion_stops_search() {
        let shared = SharedIncumbent::new();
        assert!(!shared.should_stop());
        shared.mark_exhausted();
        assert!(shared.should_stop());
        assert!(shared.is_exhausted());
    }
}
