//! Permutation source: every ordering of the non-depot stops, bracketed by the
//! depot, in lexicographic order, plus the fixed-width table used to ship
//! contiguous slices of them to distributed workers.

use crate::distributed::Word;
use crate::error::{Error, Result};
use crate::problem::{Stop, DEPOT};
use itertools::Itertools;

/// A full candidate ordering: depot, every other stop once, depot.
pub type Permutation = Vec<Stop>;

/// Filler value for unused trailing slots of a padded table.
pub const PADDING: Word = -1;

/// Number of permutations for `stops` stops (depot included): `(stops - 1)!`.
pub fn permutation_count(stops: usize) -> Result<usize> {
    (1..stops)
        .try_fold(1usize, |acc, k| acc.checked_mul(k))
        .ok_or(Error::TooManyStops { stops })
}

/// Width of one table row: every stop plus the closing depot.
pub fn row_width(stops: usize) -> usize {
    stops + 1
}

/// Rows each worker receives when `count` rows are split over `workers`.
pub fn share_per_worker(count: usize, workers: usize) -> usize {
    count.div_ceil(workers)
}

/// Restartable, lexicographically ordered enumeration of all permutations.
#[derive(Debug, Clone, Copy)]
pub struct Permutations {
    stops: usize,
}

impl Permutations {
    pub fn new(stops: usize) -> Self {
        Permutations { stops }
    }

    pub fn count(&self) -> Result<usize> {
        permutation_count(self.stops)
    }

    /// Iterate from the first permutation. Each call starts over.
    pub fn iter(&self) -> impl Iterator<Item = Permutation> {
        let customers = self.stops.saturating_sub(1);
        (1..self.stops).permutations(customers).map(move |order| {
            let mut permutation = Vec::with_capacity(customers + 2);
            permutation.push(DEPOT);
            permutation.extend(order);
            permutation.push(DEPOT);
            permutation
        })
    }
}

/// Rectangular table of permutations flattened into one word buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    width: usize,
    data: Vec<Word>,
}

impl PermutationTable {
    /// Materialize every permutation of `stops` stops.
    pub fn generate(stops: usize) -> Result<Self> {
        let width = row_width(stops);
        let count = permutation_count(stops)?;
        let len = count
            .checked_mul(width)
            .ok_or(Error::TooManyStops { stops })?;

        let mut data = Vec::with_capacity(len);
        for permutation in Permutations::new(stops).iter() {
            data.extend(permutation.into_iter().map(|stop| stop as Word));
        }

        Ok(PermutationTable { width, data })
    }

    /// Wrap a flat buffer received from a peer.
    pub fn from_flat(data: Vec<Word>, width: usize) -> Result<Self> {
        if width == 0 || data.len() % width != 0 {
            return Err(Error::invalid_data(format!(
                "buffer of {} words is not a whole number of rows of width {width}",
                data.len()
            )));
        }
        Ok(PermutationTable { width, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn row_count(&self) -> usize {
        self.data.len() / self.width
    }

    pub fn row(&self, index: usize) -> &[Word] {
        &self.data[index * self.width..(index + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Word]> {
        self.data.chunks_exact(self.width)
    }

    /// Append padding rows until the table holds `rows` rows.
    pub fn pad_to(&mut self, rows: usize) {
        if rows > self.row_count() {
            self.data.resize(rows * self.width, PADDING);
        }
    }

    pub fn into_flat(self) -> Vec<Word> {
        self.data
    }

    /// Turn the rows back into permutations, skipping padding rows.
    ///
    /// Returns the permutations and the number of padding rows skipped. A row
    /// that mixes padding with stop ids, or names a stop outside `[0, stops)`,
    /// is malformed.
    pub fn decode(&self, stops: usize) -> Result<(Vec<Permutation>, usize)> {
        let mut permutations = Vec::with_capacity(self.row_count());
        let mut padding = 0;

        for (index, row) in self.rows().enumerate() {
            if is_padding_row(row) {
                padding += 1;
                continue;
            }

            let permutation = row
                .iter()
                .map(|&word| match usize::try_from(word) {
                    Ok(stop) if stop < stops => Ok(stop),
                    _ => Err(Error::invalid_data(format!(
                        "row {index} holds {word}, expected a stop in [0, {stops})"
                    ))),
                })
                .collect::<Result<Permutation>>()?;
            permutations.push(permutation);
        }

        Ok((permutations, padding))
    }
}

/// A row made entirely of padding is not a candidate.
pub fn is_padding_row(row: &[Word]) -> bool {
    !row.is_empty() && row.iter().all(|&word| word == PADDING)
}
