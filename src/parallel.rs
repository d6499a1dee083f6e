//! Shared-memory executor: repairs a permutation set on a fixed thread pool.
//!
//! The set is split into at most `threads` contiguous slices, one per worker.
//! The slice boundaries are fixed up front; which pool thread runs a given
//! slice is left to the scheduler.
//! Each worker fills its own result list and the lists are concatenated in
//! slice order once every worker has finished, so no lock guards the output
//! and survivors keep enumeration order.

use crate::error::{Error, Result};
use crate::permutation::Permutation;
use crate::problem::Problem;
use crate::repair::{filter_routes, FilterOutcome};
use crate::route::SearchResult;
use crate::selector::Selector;
use rayon::prelude::*;
use std::thread;

const THREAD_FALLBACK_PARALLELISM: usize = 2;

/// Runs the repair pass over disjoint index ranges on concurrent workers.
#[derive(Debug, Clone, Copy)]
pub struct ParallelExecutor {
    threads: usize,
}

impl ParallelExecutor {
    /// Create an executor with a fixed number of workers (at least one).
    pub fn new(threads: usize) -> Self {
        ParallelExecutor {
            threads: threads.max(1),
        }
    }

    /// Create an executor sized to the machine.
    pub fn with_available_parallelism() -> Self {
        Self::new(Self::available_threads())
    }

    pub fn available_threads() -> usize {
        thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(THREAD_FALLBACK_PARALLELISM)
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Repair every permutation and return all survivors.
    pub fn filter_routes(
        &self,
        permutations: &[Permutation],
        problem: &Problem,
    ) -> Result<FilterOutcome> {
        if permutations.is_empty() {
            return Ok(FilterOutcome::default());
        }

        let share = permutations.len().div_ceil(self.threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

        log::debug!(
            "parallel: start permutations={} threads={} share={share}",
            permutations.len(),
            self.threads
        );

        let partials: Vec<FilterOutcome> = pool.install(|| {
            permutations
                .par_chunks(share)
                .enumerate()
                .map(|(worker, slice)| {
                    let outcome = filter_routes(slice, problem);
                    log::trace!(
                        "parallel: worker={worker} evaluated={} accepted={}",
                        outcome.evaluated,
                        outcome.accepted()
                    );
                    outcome
                })
                .collect()
        });

        let mut outcome = FilterOutcome::default();
        for partial in partials {
            outcome.merge(partial);
        }

        log::debug!(
            "parallel: done evaluated={} accepted={} rejected={}",
            outcome.evaluated,
            outcome.accepted(),
            outcome.rejected
        );

        Ok(outcome)
    }

    /// Repair every permutation and select the cheapest survivor.
    pub fn search(&self, permutations: &[Permutation], problem: &Problem) -> Result<SearchResult> {
        let outcome = self.filter_routes(permutations, problem)?;
        Ok(Selector::select(outcome.routes))
    }
}
