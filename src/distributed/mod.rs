//! Distributed executor: partition the permutation set over a group of ranks,
//! repair locally, gather the survivors at the coordinator and select there.
//!
//! Protocol, every step a blocking collective:
//!
//! 1. the coordinator loads the instance and materializes the permutation table;
//! 2. it broadcasts the header, the demand vector and the cost matrix row by row;
//! 3. every rank derives the per-rank share and the row width;
//! 4. the coordinator pads the table with `-1` rows to `share * ranks` rows;
//! 5. the table is scattered, `share` rows per rank;
//! 6. every rank drops padding rows and repairs the rest on its thread pool;
//! 7. survivors are encoded as a length-prefixed word stream;
//! 8. stream lengths are gathered and turned into offsets;
//! 9. the streams are gathered into one buffer at those offsets;
//! 10. the coordinator decodes the buffer and selects the cheapest route.

pub mod cluster;
pub mod codec;
pub mod comm;

pub use cluster::{ChannelCommunicator, LocalCluster};
pub use comm::{Communicator, GatherLayout, Word, ROOT};

use crate::error::{Error, Result};
use crate::parallel::ParallelExecutor;
use crate::permutation::{row_width, share_per_worker, PermutationTable};
use crate::problem::Problem;
use crate::route::SearchResult;
use crate::selector::Selector;
use codec::{decode_routes, encode_routes};

const HEADER_LEN: usize = 5;
const NONE: Word = -1;

/// What one rank did during a distributed run.
#[derive(Debug, Clone)]
pub struct RankReport {
    pub rank: usize,
    /// Real permutations repaired by this rank.
    pub evaluated: usize,
    /// Survivors this rank shipped to the coordinator.
    pub accepted: usize,
    /// Padding rows this rank skipped.
    pub padding: usize,
    /// The global result; only the coordinator has one.
    pub result: Option<SearchResult>,
}

/// Runs the protocol on one rank.
pub struct DistributedExecutor<'a, C: Communicator> {
    comm: &'a C,
    threads: usize,
}

impl<'a, C: Communicator> DistributedExecutor<'a, C> {
    /// `threads` is the size of this rank's own thread pool.
    pub fn new(comm: &'a C, threads: usize) -> Self {
        DistributedExecutor { comm, threads }
    }

    /// Run the search. `load` is only called on the coordinator; if it fails
    /// every other rank is aborted before any of them can block forever.
    pub fn run<F>(&self, load: F) -> Result<RankReport>
    where
        F: FnOnce() -> Result<Problem>,
    {
        let size = self.comm.size();
        let rank = self.comm.rank();
        if size < 2 {
            return Err(Error::TooFewWorkers { found: size });
        }

        let (problem, table) = if self.comm.is_root() {
            let problem = self.or_abort(load())?;
            let table = self.or_abort(PermutationTable::generate(problem.stop_count()))?;
            (Some(problem), Some(table))
        } else {
            (None, None)
        };

        let (problem, permutation_count) =
            self.broadcast_problem(problem, table.as_ref().map(PermutationTable::row_count))?;

        let share = share_per_worker(permutation_count, size);
        let width = row_width(problem.stop_count());
        if self.comm.is_root() {
            log::info!(
                "distributed: start ranks={size} permutations={permutation_count} share={share} width={width}"
            );
        }

        let flat = table.map(|mut table| {
            table.pad_to(share * size);
            table.into_flat()
        });
        let local = self.comm.scatter(flat.as_deref(), share * width)?;

        let local = self.or_abort(PermutationTable::from_flat(local, width))?;
        let (permutations, padding) = self.or_abort(local.decode(problem.stop_count()))?;
        let outcome = self.or_abort(
            ParallelExecutor::new(self.threads).filter_routes(&permutations, &problem),
        )?;
        let stream = self.or_abort(encode_routes(&outcome.routes))?;

        log::debug!(
            "distributed: rank={rank} rows={} padding={padding} accepted={} words={}",
            permutations.len(),
            outcome.accepted(),
            stream.len()
        );

        let counts = self.comm.gather(self.or_abort(to_word(stream.len()))?)?;
        let layout = match counts {
            Some(counts) => Some(GatherLayout::from_counts(
                counts
                    .into_iter()
                    .map(|count| from_word::<usize>(count, "stream length"))
                    .collect::<Result<Vec<_>>>()?,
            )),
            None => None,
        };
        let gathered = self.comm.gather_varcount(&stream, layout.as_ref())?;

        let result = match gathered {
            Some(buffer) => {
                let routes = decode_routes(&buffer)?;
                log::info!("distributed: gathered routes={}", routes.len());
                Some(Selector::select(routes))
            }
            None => None,
        };

        Ok(RankReport {
            rank,
            evaluated: outcome.evaluated,
            accepted: outcome.accepted(),
            padding,
            result,
        })
    }

    /// Replicate the instance on every rank. The coordinator passes its
    /// problem and permutation count; every rank gets both back.
    fn broadcast_problem(
        &self,
        problem: Option<Problem>,
        permutation_count: Option<usize>,
    ) -> Result<(Problem, usize)> {
        let mut header = match (&problem, permutation_count) {
            (Some(problem), Some(count)) => self.or_abort(encode_header(problem, count))?,
            _ => Vec::new(),
        };
        self.comm.broadcast(&mut header)?;
        let header = self.or_abort(decode_header(&header))?;

        let mut demands = match &problem {
            Some(problem) => problem.demands.iter().map(|&d| Word::from(d)).collect(),
            None => Vec::new(),
        };
        self.comm.broadcast(&mut demands)?;

        let mut matrix = Vec::with_capacity(header.stops);
        for row in 0..header.stops {
            let mut words = match &problem {
                Some(problem) => problem.cost_matrix[row].iter().map(|&c| Word::from(c)).collect(),
                None => Vec::new(),
            };
            self.comm.broadcast(&mut words)?;
            matrix.push(words);
        }

        match problem {
            Some(problem) => Ok((problem, header.permutation_count)),
            None => {
                let problem = self.or_abort(rebuild_problem(&header, &demands, &matrix))?;
                Ok((problem, header.permutation_count))
            }
        }
    }

    fn or_abort<T>(&self, result: Result<T>) -> Result<T> {
        result.map_err(|e| {
            self.comm.abort(&e.to_string());
            e
        })
    }
}

struct Header {
    permutation_count: usize,
    vehicle_capacity: u32,
    max_stops: Option<usize>,
    max_cost: Option<u64>,
    stops: usize,
}

fn encode_header(problem: &Problem, permutation_count: usize) -> Result<Vec<Word>> {
    Ok(vec![
        to_word(permutation_count)?,
        Word::from(problem.vehicle_capacity),
        problem.max_stops.map(to_word).transpose()?.unwrap_or(NONE),
        problem
            .max_cost
            .map(|cost| {
                Word::try_from(cost)
                    .map_err(|_| Error::invalid_data(format!("cost ceiling {cost} overflows a word")))
            })
            .transpose()?
            .unwrap_or(NONE),
        to_word(problem.stop_count())?,
    ])
}

fn decode_header(words: &[Word]) -> Result<Header> {
    if words.len() != HEADER_LEN {
        return Err(Error::invalid_data(format!(
            "broadcast header holds {} words, expected {HEADER_LEN}",
            words.len()
        )));
    }

    Ok(Header {
        permutation_count: from_word(words[0], "permutation count")?,
        vehicle_capacity: from_word(words[1], "vehicle capacity")?,
        max_stops: optional(words[2], "max stops")?,
        max_cost: optional(words[3], "max cost")?,
        stops: from_word(words[4], "stop count")?,
    })
}

fn rebuild_problem(header: &Header, demands: &[Word], matrix: &[Vec<Word>]) -> Result<Problem> {
    let demands = demands
        .iter()
        .map(|&word| from_word(word, "demand"))
        .collect::<Result<Vec<u32>>>()?;
    let cost_matrix = matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|&word| from_word(word, "cost"))
                .collect::<Result<Vec<u32>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut problem = Problem::new(
        "broadcast".to_string(),
        demands,
        cost_matrix,
        header.vehicle_capacity,
    )?;
    problem.max_stops = header.max_stops;
    problem.max_cost = header.max_cost;

    Ok(problem)
}

fn to_word(value: usize) -> Result<Word> {
    Word::try_from(value).map_err(|_| Error::invalid_data(format!("{value} overflows a word")))
}

fn from_word<T: TryFrom<Word>>(word: Word, what: &str) -> Result<T> {
    T::try_from(word).map_err(|_| Error::invalid_data(format!("{what} out of range: {word}")))
}

fn optional<T: TryFrom<Word>>(word: Word, what: &str) -> Result<Option<T>> {
    if word == NONE {
        Ok(None)
    } else {
        from_word(word, what).map(Some)
    }
}
