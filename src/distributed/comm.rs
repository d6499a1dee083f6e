//! Collective operations over a fixed group of ranks.
//!
//! Every operation is blocking and must be entered by all ranks in the same
//! order. Rank `ROOT` is the coordinator: it is the source of broadcasts and
//! scatters and the destination of gathers.

use crate::error::Result;

/// Unit of every buffer moved between ranks.
pub type Word = i64;

/// Rank of the coordinator.
pub const ROOT: usize = 0;

/// Where each rank's contribution lands in a variable-length gather.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherLayout {
    pub counts: Vec<usize>,
    pub displacements: Vec<usize>,
    pub total: usize,
}

impl GatherLayout {
    /// Offsets are the prefix sums of the per-rank counts.
    pub fn from_counts(counts: Vec<usize>) -> Self {
        let mut displacements = Vec::with_capacity(counts.len());
        let mut total = 0;
        for &count in &counts {
            displacements.push(total);
            total += count;
        }

        GatherLayout {
            counts,
            displacements,
            total,
        }
    }
}

pub trait Communicator {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }

    /// Replace every rank's `buffer` with the coordinator's.
    fn broadcast(&self, buffer: &mut Vec<Word>) -> Result<()>;

    /// Split the coordinator's `send` buffer into `size` slices of `chunk_len`
    /// words and hand slice `r` to rank `r`. Only the coordinator passes `Some`.
    fn scatter(&self, send: Option<&[Word]>, chunk_len: usize) -> Result<Vec<Word>>;

    /// Collect one word from every rank, in rank order, at the coordinator.
    fn gather(&self, value: Word) -> Result<Option<Vec<Word>>>;

    /// Collect a variable-length buffer from every rank into one buffer at the
    /// coordinator, placed at the layout's displacements.
    fn gather_varcount(
        &self,
        send: &[Word],
        layout: Option<&GatherLayout>,
    ) -> Result<Option<Vec<Word>>>;

    /// Tell every other rank to give up. Ranks blocked in a collective fail
    /// with `Error::Aborted` instead of waiting forever.
    fn abort(&self, reason: &str);
}
