//! # CVRP exhaustive search
//!
//! Finds the minimum-cost delivery route from a single depot through every
//! demand-bearing stop under a vehicle capacity, by enumerating every visiting
//! order and repairing each one with depot returns where capacity or
//! connectivity would be violated.
//!
//! The same repair pass runs under three execution strategies:
//! sequentially, on a shared-memory thread pool, or partitioned across the
//! ranks of a cluster that gather their survivors at a coordinator. All of
//! them agree on the result. The search is factorial in the number of stops
//! and only meant for small instances.

pub mod config;
pub mod distributed;
pub mod error;
pub mod generator;
pub mod greedy;
pub mod parallel;
pub mod permutation;
pub mod problem;
pub mod repair;
pub mod route;
pub mod selector;
pub mod utils;

pub use error::{Error, Result};

use crate::config::{Config, Strategy};
use crate::distributed::{DistributedExecutor, LocalCluster};
use crate::parallel::ParallelExecutor;
use crate::permutation::{Permutation, Permutations};
use crate::problem::Problem;
use crate::repair::filter_routes;
use crate::route::SearchResult;
use crate::selector::Selector;
use crate::utils::SearchStatistics;

use std::time::{Duration, Instant};

/// Instances above this size take noticeably long to enumerate.
const LARGE_INSTANCE_STOPS: usize = 11;

/// The main structure that runs a search with the configured strategy.
pub struct ExhaustiveSearch {
    pub problem: Problem,
    pub config: Config,
    pub result: Option<SearchResult>,
    pub run_time: Duration,
    /// Permutations (or orderings) that went through repair
    pub evaluated: usize,
    /// Routes that survived repair
    pub accepted: usize,
}

impl ExhaustiveSearch {
    /// Create a new search for the given problem and configuration.
    pub fn new(problem: Problem, config: Config) -> Self {
        ExhaustiveSearch {
            problem,
            config,
            result: None,
            run_time: Duration::from_secs(0),
            evaluated: 0,
            accepted: 0,
        }
    }

    /// Run the search to completion.
    pub fn run(&mut self) -> Result<&SearchResult> {
        let start_time = Instant::now();
        self.evaluated = 0;
        self.accepted = 0;

        let stops = self.problem.stop_count();
        if stops > LARGE_INSTANCE_STOPS && self.config.strategy != Strategy::NearestNeighbor {
            log::warn!(
                "search: {stops} stops means {} permutations",
                Permutations::new(stops).count()?
            );
        }

        let result = if !self.config.skip_connectivity_check && !self.problem.is_connected() {
            log::warn!("search: graph is disconnected, no route can visit every stop");
            SearchResult::NoFeasibleRoute
        } else {
            match self.config.strategy {
                Strategy::Sequential => self.run_sequential()?,
                Strategy::Parallel => self.run_parallel()?,
                Strategy::Distributed => self.run_distributed()?,
                Strategy::NearestNeighbor => self.run_nearest_neighbor(),
            }
        };

        self.run_time = start_time.elapsed();
        log::info!(
            "search: done strategy={:?} evaluated={} accepted={} cost={:?}",
            self.config.strategy,
            self.evaluated,
            self.accepted,
            result.total_cost()
        );

        Ok(self.result.insert(result))
    }

    fn run_sequential(&mut self) -> Result<SearchResult> {
        let permutations = Permutations::new(self.problem.stop_count());
        log::info!("search: sequential permutations={}", permutations.count()?);

        let outcome = filter_routes(permutations.iter(), &self.problem);
        self.evaluated = outcome.evaluated;
        self.accepted = outcome.accepted();

        Ok(Selector::select(outcome.routes))
    }

    fn run_parallel(&mut self) -> Result<SearchResult> {
        let source = Permutations::new(self.problem.stop_count());
        let executor = self.executor();
        log::info!(
            "search: parallel permutations={} threads={}",
            source.count()?,
            executor.threads()
        );

        let permutations: Vec<Permutation> = source.iter().collect();
        let outcome = executor.filter_routes(&permutations, &self.problem)?;
        self.evaluated = outcome.evaluated;
        self.accepted = outcome.accepted();

        Ok(Selector::select(outcome.routes))
    }

    fn run_distributed(&mut self) -> Result<SearchResult> {
        let workers = self.config.workers;
        if workers < 2 {
            return Err(Error::TooFewWorkers { found: workers });
        }

        let threads_per_rank = (self.executor().threads() / workers).max(1);
        log::info!("search: distributed ranks={workers} threads_per_rank={threads_per_rank}");

        let problem = &self.problem;
        let reports = LocalCluster::new(workers).run(|comm| {
            DistributedExecutor::new(comm, threads_per_rank).run(|| Ok(problem.clone()))
        });

        let mut result = None;
        let mut first_error = None;
        for (rank, report) in reports.into_iter().enumerate() {
            match report {
                Ok(report) => {
                    self.evaluated += report.evaluated;
                    self.accepted += report.accepted;
                    if report.result.is_some() {
                        result = report.result;
                    }
                }
                Err(e) => {
                    log::debug!("search: rank={rank} failed: {e}");
                    // Reports come in rank order, so the coordinator's error wins.
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }
        result.ok_or_else(|| Error::other("coordinator finished without a result"))
    }

    fn run_nearest_neighbor(&mut self) -> SearchResult {
        let result = greedy::search(&self.problem);
        self.evaluated = 1;
        self.accepted = usize::from(result.is_found());
        result
    }

    fn executor(&self) -> ParallelExecutor {
        match self.config.threads {
            Some(threads) => ParallelExecutor::new(threads),
            None => ParallelExecutor::with_available_parallelism(),
        }
    }

    /// Summary of the last run.
    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            strategy: self.config.strategy,
            stops: self.problem.stop_count(),
            evaluated: self.evaluated,
            accepted: self.accepted,
            runtime: self.run_time,
            best_cost: self.result.as_ref().and_then(SearchResult::total_cost),
        }
    }
}
