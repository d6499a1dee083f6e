//! Execution settings for a search run.

use serde::{Deserialize, Serialize};

/// How the permutation set is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One thread, permutations consumed as they are generated
    Sequential,
    /// A fixed thread pool over statically partitioned slices
    Parallel,
    /// A cluster of ranks, each running its own thread pool
    Distributed,
    /// A single nearest-neighbour ordering, repaired
    NearestNeighbor,
}

/// Configuration settings for a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Execution strategy
    pub strategy: Strategy,
    /// Shared-memory workers; `None` uses the machine's available parallelism
    pub threads: Option<usize>,
    /// Ranks in a distributed run, coordinator included
    pub workers: usize,
    /// Enumerate even when the graph is disconnected
    pub skip_connectivity_check: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            strategy: Strategy::Parallel,
            threads: None,
            workers: 4,
            skip_connectivity_check: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the execution strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the number of shared-memory workers.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Set the number of distributed ranks.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Disable the connectivity precheck.
    pub fn with_skip_connectivity_check(mut self, skip: bool) -> Self {
        self.skip_connectivity_check = skip;
        self
    }
}
