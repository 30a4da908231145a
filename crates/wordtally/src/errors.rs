//! # Error Types

use core::fmt;
use std::{io, path::PathBuf};

use crate::pipeline::PipelineState;

/// Errors retrieving source text.
///
/// A fetch error means the pipeline never started.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source does not exist.
    #[error("source not found: {locator}")]
    NotFound {
        /// The requested locator.
        locator: String,
    },

    /// The source did not respond in time.
    #[error("timed out fetching {locator}")]
    Timeout {
        /// The requested locator.
        locator: String,
    },

    /// The download failed.
    #[error("network error fetching {locator}: {message}")]
    Network {
        /// The requested locator.
        locator: String,

        /// What the transport reported.
        message: String,
    },

    /// Reading a local source failed.
    #[error("i/o error reading {locator}: {source}")]
    Io {
        /// The requested locator.
        locator: String,

        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Downloads are disabled, and the source is not cached.
    #[error("{locator} is not cached at {} and downloads are disabled", path.display())]
    NotCached {
        /// The requested locator.
        locator: String,

        /// Where the cached copy would be.
        path: PathBuf,
    },

    /// The source kind is not supported by this build.
    #[error("unsupported source {locator}: {reason}")]
    Unsupported {
        /// The requested locator.
        locator: String,

        /// Why.
        reason: String,
    },
}

impl FetchError {
    /// The locator this error is about.
    pub fn locator(&self) -> &str {
        match self {
            FetchError::NotFound { locator }
            | FetchError::Timeout { locator }
            | FetchError::Network { locator, .. }
            | FetchError::Io { locator, .. }
            | FetchError::NotCached { locator, .. }
            | FetchError::Unsupported { locator, .. } => locator,
        }
    }
}

/// Why a single map stage worker failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// The counter returned an error.
    #[error("{0}")]
    Failed(String),

    /// The worker panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// A count exceeded the capacity of the count type.
    #[error("count overflow for token {0:?}")]
    CountOverflow(String),

    /// The worker did not report before the map stage deadline.
    #[error("timed out")]
    TimedOut,

    /// The worker went away without reporting a result.
    #[error("exited without reporting a result")]
    Disconnected,
}

/// A [`WorkerError`] tagged with the chunk it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFailure {
    /// The index of the failed chunk.
    pub chunk: usize,

    /// What went wrong.
    pub error: WorkerError,
}

impl fmt::Display for ChunkFailure {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "chunk {}: {}", self.chunk, self.error)
    }
}

fn describe_failures(failures: &[ChunkFailure]) -> String {
    let chunks: Vec<String> = failures.iter().map(|f| f.chunk.to_string()).collect();
    let details: Vec<String> = failures.iter().map(|f| f.to_string()).collect();
    format!("[{}] ({})", chunks.join(", "), details.join("; "))
}

/// Errors from wordtally operations.
#[derive(Debug, thiserror::Error)]
pub enum WordtallyError {
    /// One or more map stage workers failed; no total was produced.
    #[error("worker failure in chunk(s) {}", describe_failures(.failures))]
    WorkerFailure {
        /// The failures, in ascending chunk order.
        failures: Vec<ChunkFailure>,
    },

    /// The aggregator was given an incomplete or inconsistent set of partial tables.
    #[error("aggregation precondition violated: {0}")]
    AggregationPrecondition(String),

    /// A merged count exceeded the capacity of the count type.
    #[error("count overflow while merging token {token:?}")]
    CountOverflow {
        /// The token whose count overflowed.
        token: String,
    },

    /// The pipeline state machine was driven out of order.
    #[error("invalid pipeline transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// The current state.
        from: PipelineState,

        /// The requested state.
        to: PipelineState,
    },

    /// The map stage backend could not be started.
    #[error("map executor error: {0}")]
    Executor(String),
}

impl WordtallyError {
    /// The failed chunk indices, for [`WordtallyError::WorkerFailure`].
    pub fn failed_chunks(&self) -> Vec<usize> {
        match self {
            WordtallyError::WorkerFailure { failures } => {
                failures.iter().map(|f| f.chunk).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Result type for wordtally operations.
pub type WTResult<T> = core::result::Result<T, WordtallyError>;
