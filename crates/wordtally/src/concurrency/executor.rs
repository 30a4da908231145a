//! # Map Stage Executor

use core::{any::Any, fmt};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, mpsc},
    thread,
    time::Duration,
};

use crate::{
    concurrency::collector::{ResultCollector, WorkerReport},
    counting::{Aggregator, ChunkCounter},
    errors::{WTResult, WorkerError, WordtallyError},
    partition::Chunk,
    token::Token,
    types::CountType,
};

/// The default post-failure grace window.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_millis(100);

/// Which execution units run the map stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapBackend {
    /// One named OS thread per chunk.
    Threads,

    /// Tasks on a dedicated ``rayon`` pool, sized to
    /// ``min(chunks, est_max_parallelism())``.
    #[cfg(feature = "rayon")]
    Rayon,
}

impl Default for MapBackend {
    fn default() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                MapBackend::Rayon
            } else {
                MapBackend::Threads
            }
        }
    }
}

impl fmt::Display for MapBackend {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            MapBackend::Threads => f.write_str("threads"),
            #[cfg(feature = "rayon")]
            MapBackend::Rayon => f.write_str("rayon"),
        }
    }
}

/// Runs the map stage: one [`ChunkCounter`] job per [`Chunk`].
///
/// [`MapExecutor::run_map`] is the pipeline's single barrier; it returns
/// only after every chunk has reported, or the run has failed.
/// On failure, outstanding workers are abandoned rather than interrupted;
/// their late results are discarded.
#[derive(Debug, Clone)]
pub struct MapExecutor {
    /// The execution backend.
    pub backend: MapBackend,

    /// Optional bound on the whole map stage.
    pub map_timeout: Option<Duration>,

    /// How long to keep listening for further failures after the first.
    pub cancel_grace: Duration,
}

impl Default for MapExecutor {
    fn default() -> Self {
        Self::new(MapBackend::default())
    }
}

impl MapExecutor {
    /// Create an executor for `backend`, with no map timeout.
    pub fn new(backend: MapBackend) -> Self {
        Self {
            backend,
            map_timeout: None,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }

    /// Set the map stage timeout.
    pub fn with_map_timeout(
        self,
        map_timeout: Option<Duration>,
    ) -> Self {
        Self {
            map_timeout,
            ..self
        }
    }

    /// Set the post-failure grace window.
    pub fn with_cancel_grace(
        self,
        cancel_grace: Duration,
    ) -> Self {
        Self {
            cancel_grace,
            ..self
        }
    }

    /// Count every chunk in parallel.
    ///
    /// ## Arguments
    /// * `tokens` - the shared, read-only token sequence.
    /// * `chunks` - the partition of `tokens`; indices must be ``0..chunks.len()``.
    /// * `counter` - the map function.
    ///
    /// ## Returns
    /// A complete [`Aggregator`] holding one partial table per chunk.
    pub fn run_map<C: CountType>(
        &self,
        tokens: &Arc<[Token]>,
        chunks: &[Chunk],
        counter: &Arc<dyn ChunkCounter<C>>,
    ) -> WTResult<Aggregator<C>> {
        let (sender, receiver) = mpsc::channel::<WorkerReport<C>>();

        log::debug!(
            "map stage: {} chunk(s) over {} token(s) on {} backend",
            chunks.len(),
            tokens.len(),
            self.backend
        );

        let jobs = chunks.iter().map(|chunk| {
            MapJob {
                chunk: chunk.clone(),
                tokens: tokens.clone(),
                counter: counter.clone(),
                sender: sender.clone(),
            }
        });

        match self.backend {
            MapBackend::Threads => spawn_threads(jobs)?,
            #[cfg(feature = "rayon")]
            MapBackend::Rayon => spawn_rayon(jobs, chunks.len())?,
        }

        // Only the workers hold senders now; so a worker that vanishes
        // without reporting surfaces as a disconnect.
        drop(sender);

        ResultCollector::new(receiver, chunks.len(), self.map_timeout, self.cancel_grace).collect()
    }
}

/// One worker's owned inputs.
struct MapJob<C: CountType> {
    chunk: Chunk,
    tokens: Arc<[Token]>,
    counter: Arc<dyn ChunkCounter<C>>,
    sender: mpsc::Sender<WorkerReport<C>>,
}

impl<C: CountType> MapJob<C> {
    fn run(self) {
        let MapJob {
            chunk,
            tokens,
            counter,
            sender,
        } = self;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            counter.count_chunk(&chunk, chunk.slice(&tokens))
        }))
        .unwrap_or_else(|payload| Err(WorkerError::Panicked(panic_message(payload.as_ref()))));

        // The driver may have given up on this run; a late result is dropped.
        if sender.send((chunk.index, result)).is_err() {
            log::debug!("chunk {}: result discarded; map stage abandoned", chunk.index);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn spawn_threads<C, I>(jobs: I) -> WTResult<()>
where
    C: CountType,
    I: Iterator<Item = MapJob<C>>,
{
    for job in jobs {
        let index = job.chunk.index;
        thread::Builder::new()
            .name(format!("wordtally-map-{index}"))
            .spawn(move || job.run())
            .map_err(|e| {
                WordtallyError::Executor(format!("failed to spawn worker for chunk {index}: {e}"))
            })?;
    }
    Ok(())
}

#[cfg(feature = "rayon")]
fn spawn_rayon<C, I>(
    jobs: I,
    chunk_count: usize,
) -> WTResult<()>
where
    C: CountType,
    I: Iterator<Item = MapJob<C>>,
{
    use std::num::NonZeroUsize;

    use crate::concurrency::threads::resolve_pool_size;

    let Some(chunk_count) = NonZeroUsize::new(chunk_count) else {
        return Ok(());
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(resolve_pool_size(chunk_count).get())
        .thread_name(|idx| format!("wordtally-map-{idx}"))
        .build()
        .map_err(|e| WordtallyError::Executor(e.to_string()))?;

    for job in jobs {
        pool.spawn(move || job.run());
    }

    // Dropping the pool does not block; its threads exit once the queue drains.
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::{
        counting::{FrequencyTable, TokenCounter, count_tokens},
        partition::partition,
        tokenize::tokenize,
        types::{check_is_send, check_is_sync},
    };

    const TEXT: &str = "It is a truth universally acknowledged, that a single man in \
        possession of a good fortune, must be in want of a wife.";

    #[allow(unused_mut)]
    fn backends() -> Vec<MapBackend> {
        let mut backends = vec![MapBackend::Threads];
        #[cfg(feature = "rayon")]
        backends.push(MapBackend::Rayon);
        backends
    }

    fn setup(workers: usize) -> (Arc<[Token]>, Vec<Chunk>) {
        let tokens: Arc<[Token]> = tokenize(TEXT).into();
        let chunks = partition(tokens.len(), NonZeroUsize::new(workers).unwrap());
        (tokens, chunks)
    }

    /// Fails (or panics) on one chunk; counts normally elsewhere.
    struct FaultyCounter {
        bad_chunk: usize,
        panic: bool,
    }

    impl ChunkCounter<u64> for FaultyCounter {
        fn count_chunk(
            &self,
            chunk: &Chunk,
            tokens: &[Token],
        ) -> Result<FrequencyTable<u64>, WorkerError> {
            if chunk.index == self.bad_chunk {
                if self.panic {
                    panic!("injected panic in chunk {}", chunk.index);
                }
                return Err(WorkerError::Failed("resource exhausted".to_string()));
            }
            TokenCounter.count_chunk(chunk, tokens)
        }
    }

    /// Never finishes within any reasonable test timeout.
    struct StuckCounter;

    impl ChunkCounter<u64> for StuckCounter {
        fn count_chunk(
            &self,
            chunk: &Chunk,
            tokens: &[Token],
        ) -> Result<FrequencyTable<u64>, WorkerError> {
            if chunk.index == 0 {
                thread::sleep(Duration::from_secs(2));
            }
            TokenCounter.count_chunk(chunk, tokens)
        }
    }

    #[test]
    fn test_executor_is_send_sync() {
        let executor = MapExecutor::default();
        check_is_send(&executor);
        check_is_sync(&executor);
    }

    #[test]
    fn test_run_map_matches_sequential() {
        let (tokens, _) = setup(1);
        let expected: FrequencyTable = count_tokens(tokens.iter()).unwrap();

        for backend in backends() {
            for workers in [1, 2, 3, 7, 64] {
                let (tokens, chunks) = setup(workers);
                let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(TokenCounter);

                let aggregator = MapExecutor::new(backend)
                    .run_map(&tokens, &chunks, &counter)
                    .unwrap();
                assert_eq!(aggregator.received(), workers);

                let total = aggregator.finish().unwrap();
                assert_eq!(total, expected, "backend={backend}, workers={workers}");
            }
        }
    }

    #[test]
    fn test_worker_failure() {
        for backend in backends() {
            let (tokens, chunks) = setup(4);
            let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(FaultyCounter {
                bad_chunk: 2,
                panic: false,
            });

            let err = MapExecutor::new(backend)
                .run_map(&tokens, &chunks, &counter)
                .unwrap_err();

            assert_eq!(err.failed_chunks(), vec![2], "backend={backend}");
            assert!(err.to_string().contains("resource exhausted"));
        }
    }

    #[test]
    fn test_worker_panic_is_caught() {
        for backend in backends() {
            let (tokens, chunks) = setup(3);
            let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(FaultyCounter {
                bad_chunk: 0,
                panic: true,
            });

            let err = MapExecutor::new(backend)
                .run_map(&tokens, &chunks, &counter)
                .unwrap_err();

            match err {
                WordtallyError::WorkerFailure { failures } => {
                    assert_eq!(failures.len(), 1);
                    assert_eq!(failures[0].chunk, 0);
                    assert_eq!(
                        failures[0].error,
                        WorkerError::Panicked("injected panic in chunk 0".to_string())
                    );
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_map_timeout() {
        for backend in backends() {
            let (tokens, chunks) = setup(2);
            let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(StuckCounter);

            let start = std::time::Instant::now();
            let err = MapExecutor::new(backend)
                .with_map_timeout(Some(Duration::from_millis(50)))
                .run_map(&tokens, &chunks, &counter)
                .unwrap_err();
            assert!(start.elapsed() < Duration::from_secs(2));

            // A single-thread rayon pool may not have started chunk 1 either.
            match err {
                WordtallyError::WorkerFailure { failures } => {
                    assert_eq!(failures[0].chunk, 0);
                    assert!(failures.iter().all(|f| f.error == WorkerError::TimedOut));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_no_chunks() {
        for backend in backends() {
            let tokens: Arc<[Token]> = Vec::new().into();
            let counter: Arc<dyn ChunkCounter<u64>> = Arc::new(TokenCounter);

            let aggregator = MapExecutor::new(backend)
                .run_map(&tokens, &[], &counter)
                .unwrap();
            assert!(aggregator.finish().unwrap().is_empty());
        }
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");

        let payload: Box<dyn Any + Send> = Box::new(17u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
