//! # Map Stage Barrier
//!
//! Workers report ``(chunk index, result)`` over a channel; the
//! [`ResultCollector`] blocks until every chunk has reported, the first
//! failure's grace window closes, or the map stage deadline passes.

use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::{Duration, Instant},
};

use crate::{
    counting::{Aggregator, FrequencyTable},
    errors::{ChunkFailure, WTResult, WorkerError, WordtallyError},
    types::CountType,
};

/// The message a worker sends when it finishes.
pub type WorkerReport<C> = (usize, Result<FrequencyTable<C>, WorkerError>);

/// Why collection stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Deadline,
    Disconnected,
}

/// The driver side of the map stage barrier.
pub struct ResultCollector<C: CountType> {
    receiver: Receiver<WorkerReport<C>>,
    expected: usize,
    map_timeout: Option<Duration>,
    cancel_grace: Duration,
}

impl<C: CountType> ResultCollector<C> {
    /// Create a collector.
    ///
    /// ## Arguments
    /// * `receiver` - the worker report channel.
    /// * `expected` - the number of chunks.
    /// * `map_timeout` - optional bound on the whole map stage.
    /// * `cancel_grace` - how long to keep listening for further failures
    ///   after the first one.
    pub fn new(
        receiver: Receiver<WorkerReport<C>>,
        expected: usize,
        map_timeout: Option<Duration>,
        cancel_grace: Duration,
    ) -> Self {
        Self {
            receiver,
            expected,
            map_timeout,
            cancel_grace,
        }
    }

    fn recv_until(
        &self,
        deadline: Option<Instant>,
    ) -> Result<WorkerReport<C>, Interrupt> {
        match deadline {
            None => self.receiver.recv().map_err(|_| Interrupt::Disconnected),
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                self.receiver
                    .recv_timeout(remaining)
                    .map_err(|e| match e {
                        RecvTimeoutError::Timeout => Interrupt::Deadline,
                        RecvTimeoutError::Disconnected => Interrupt::Disconnected,
                    })
            }
        }
    }

    /// Wait for the workers.
    ///
    /// ## Returns
    /// A complete [`Aggregator`], ready to [`Aggregator::finish`].
    ///
    /// ## Errors
    /// [`WordtallyError::WorkerFailure`] listing every failed chunk seen;
    /// when no worker reported a failure but some never reported at all
    /// (deadline or disconnect), those chunks are listed instead.
    pub fn collect(self) -> WTResult<Aggregator<C>> {
        let map_deadline = self.map_timeout.map(|t| Instant::now() + t);
        let mut grace_deadline: Option<Instant> = None;

        let mut aggregator = Aggregator::new(self.expected);
        let mut failures: Vec<ChunkFailure> = Vec::new();
        let mut reported = 0;
        let mut interrupt: Option<Interrupt> = None;

        while reported < self.expected {
            let deadline = match (map_deadline, grace_deadline) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };

            match self.recv_until(deadline) {
                Ok((index, Ok(table))) => {
                    reported += 1;
                    log::trace!("chunk {index}: {} distinct tokens", table.len());
                    if failures.is_empty() {
                        aggregator.accept(index, table)?;
                    }
                }
                Ok((index, Err(error))) => {
                    reported += 1;
                    log::warn!("chunk {index} failed: {error}");
                    failures.push(ChunkFailure {
                        chunk: index,
                        error,
                    });
                    if grace_deadline.is_none() {
                        grace_deadline = Some(Instant::now() + self.cancel_grace);
                    }
                }
                Err(reason) => {
                    interrupt = Some(reason);
                    break;
                }
            }
        }

        if !failures.is_empty() {
            if reported < self.expected {
                log::warn!(
                    "abandoning {} outstanding worker(s)",
                    self.expected - reported
                );
            }
            failures.sort_by_key(|f| f.chunk);
            return Err(WordtallyError::WorkerFailure { failures });
        }

        if let Some(reason) = interrupt {
            let error = match reason {
                Interrupt::Deadline => WorkerError::TimedOut,
                Interrupt::Disconnected => WorkerError::Disconnected,
            };
            let failures = aggregator
                .missing_chunks()
                .into_iter()
                .map(|chunk| ChunkFailure {
                    chunk,
                    error: error.clone(),
                })
                .collect();
            log::warn!("map stage interrupted: {reason:?}");
            return Err(WordtallyError::WorkerFailure { failures });
        }

        Ok(aggregator)
    }
}
