//! Error type shared by the loader, the executors and the cluster transport.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("distributed search needs at least two workers, found {found}")]
    TooFewWorkers { found: usize },
    #[error("{stops} stops produce more permutations than can be enumerated")]
    TooManyStops { stops: usize },
    #[error("rank {rank} aborted the run: {reason}")]
    Aborted { rank: usize, reason: String },
    #[error("rank {rank} left the cluster before the collective completed")]
    Disconnected { rank: usize },
    #[error("worker thread for rank {rank} panicked")]
    WorkerPanicked { rank: usize },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
