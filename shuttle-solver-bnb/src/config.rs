//! Tunables for [`BranchAndBoundEngine`](crate::BranchAndBoundEngine).

/// Configuration for the branch-and-bound engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchAndBoundConfig {
    /// Base seed for the diversified workers. Worker `i` uses `seed + i`.
    pub seed: u64,
    /// Nodes a worker expands between wall-clock checks.
    pub check_interval: u64,
}

impl Default for BranchAndBoundConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            check_interval: 1024,
        }
    }
}

impl BranchAndBoundConfig {
    /// Set the base seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the clock-check interval; zero is treated as one.
    #[must_use]
    pub const fn with_check_interval(mut self, check_interval: u64) -> Self {
        self.check_interval = if check_interval == 0 { 1 } else { check_interval };
        self
    }
}
