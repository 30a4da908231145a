//! # Word Count Pipeline
//!
//! ```text
//! Idle -> Tokenizing -> Partitioned -> MapRunning -> Reducing -> Ranked -> Done
//!              |                           |            |
//!              +-> Done (no tokens)        +-> Failed <-+
//! ```

use std::{
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    concurrency::{DEFAULT_CANCEL_GRACE, MapBackend, MapExecutor, resolve_workers},
    counting::{Aggregator, ChunkCounter, FrequencyTable, TokenCounter},
    errors::{WTResult, WordtallyError},
    partition::{Chunk, partition},
    rank::{RankedList, rank_top_n},
    token::Token,
    tokenize::TextTokenizer,
    types::CountType,
};

/// The lifecycle states of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Not started.
    Idle,

    /// Tokenizing the input text.
    Tokenizing,

    /// Chunks have been assigned.
    Partitioned,

    /// Workers are counting; the driver is at the barrier.
    MapRunning,

    /// Merging partial tables.
    Reducing,

    /// The top-N entries have been selected.
    Ranked,

    /// Finished; with a ranking, or with no tokens.
    Done,

    /// A worker or the aggregation failed.
    Failed,
}

impl PipelineState {
    /// Is `self -> next` a legal transition?
    pub fn can_transition_to(
        self,
        next: PipelineState,
    ) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Tokenizing)
                | (Tokenizing, Partitioned)
                | (Tokenizing, Done)
                | (Partitioned, MapRunning)
                | (MapRunning, Reducing)
                | (MapRunning, Failed)
                | (Reducing, Ranked)
                | (Reducing, Failed)
                | (Ranked, Done)
        )
    }

    /// Is this a terminal state?
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

/// Records the states a run passes through.
#[derive(Debug, Clone)]
pub struct StateTracker {
    trace: Vec<PipelineState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self {
            trace: vec![PipelineState::Idle],
        }
    }
}

impl StateTracker {
    /// The current state.
    pub fn current(&self) -> PipelineState {
        self.trace
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    /// Move to `next`.
    ///
    /// ## Errors
    /// [`WordtallyError::InvalidTransition`] if the transition is illegal.
    pub fn advance(
        &mut self,
        next: PipelineState,
    ) -> WTResult<()> {
        let from = self.current();
        if !from.can_transition_to(next) {
            return Err(WordtallyError::InvalidTransition { from, to: next });
        }
        log::debug!("pipeline: {from:?} -> {next:?}");
        self.trace.push(next);
        Ok(())
    }

    /// Move to [`PipelineState::Failed`] and hand back `err`.
    pub fn fail(
        &mut self,
        err: WordtallyError,
    ) -> WordtallyError {
        if let Err(transition) = self.advance(PipelineState::Failed) {
            log::error!("{transition}");
        }
        log::warn!("pipeline failed: {err}");
        err
    }

    /// The states visited so far, starting with [`PipelineState::Idle`].
    pub fn trace(&self) -> &[PipelineState] {
        &self.trace
    }
}

/// Options for [`WordCountPipeline`].
#[derive(Debug, Clone)]
pub struct WordCountOptions {
    /// The worker (chunk) count; defaults to the available parallelism.
    pub workers: Option<NonZeroUsize>,

    /// The map stage backend.
    pub backend: MapBackend,

    /// Optional bound on the map stage.
    pub map_timeout: Option<Duration>,

    /// How long to wait for further failures after the first.
    pub cancel_grace: Duration,
}

impl Default for WordCountOptions {
    fn default() -> Self {
        Self {
            workers: None,
            backend: MapBackend::default(),
            map_timeout: None,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }
}

impl WordCountOptions {
    /// Set the worker count; `None` for the available parallelism.
    pub fn with_workers(
        self,
        workers: Option<NonZeroUsize>,
    ) -> Self {
        Self { workers, ..self }
    }

    /// Set the map stage backend.
    pub fn with_backend(
        self,
        backend: MapBackend,
    ) -> Self {
        Self { backend, ..self }
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

    /// The effective worker count.
    pub fn resolve_workers(&self) -> NonZeroUsize {
        resolve_workers(self.workers)
    }

    /// Build the map stage executor.
    pub fn executor(&self) -> MapExecutor {
        MapExecutor::new(self.backend)
            .with_map_timeout(self.map_timeout)
            .with_cancel_grace(self.cancel_grace)
    }
}

/// Wall-clock time spent in each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTimings {
    /// Tokenizing.
    pub tokenize: Duration,

    /// The map stage, up to and including the barrier.
    pub map: Duration,

    /// Merging partial tables.
    pub reduce: Duration,

    /// Selecting the top-N.
    pub rank: Duration,
}

/// The result of a successful run which found tokens.
#[derive(Debug, Clone)]
pub struct PipelineReport<C: CountType = u64> {
    /// The ranked top-N.
    pub ranked: RankedList<C>,

    /// The merged total table.
    pub total: FrequencyTable<C>,

    /// The number of tokens counted.
    pub token_count: usize,

    /// The number of chunks (workers).
    pub workers: NonZeroUsize,

    /// The partition the map stage ran over.
    pub chunks: Vec<Chunk>,

    /// The states the run passed through.
    pub trace: Vec<PipelineState>,

    /// Per-stage timings.
    pub timings: StageTimings,
}

/// The result of [`WordCountPipeline::run`].
#[derive(Debug, Clone)]
pub enum PipelineOutcome<C: CountType = u64> {
    /// The text held no tokens; nothing was counted or ranked.
    Empty,

    /// The text was counted and ranked.
    Ranked(PipelineReport<C>),
}

impl<C: CountType> PipelineOutcome<C> {
    /// Get the report, if there is one.
    pub fn report(&self) -> Option<&PipelineReport<C>> {
        match self {
            PipelineOutcome::Empty => None,
            PipelineOutcome::Ranked(report) => Some(report),
        }
    }
}

/// Tokenize -> partition -> map -> reduce -> rank.
pub struct WordCountPipeline<C: CountType = u64> {
    options: WordCountOptions,
    tokenizer: TextTokenizer,
    counter: Arc<dyn ChunkCounter<C>>,
}

impl<C: CountType> WordCountPipeline<C> {
    /// Create a pipeline using the standard [`TokenCounter`].
    pub fn new(options: WordCountOptions) -> Self {
        Self {
            options,
            tokenizer: TextTokenizer::default(),
            counter: Arc::new(TokenCounter),
        }
    }

    /// Replace the map stage counter.
    pub fn with_counter(
        self,
        counter: Arc<dyn ChunkCounter<C>>,
    ) -> Self {
        Self { counter, ..self }
    }

    /// The pipeline options.
    pub fn options(&self) -> &WordCountOptions {
        &self.options
    }

    fn map_chunks(
        &self,
        tokens: &Arc<[Token]>,
        chunks: &[Chunk],
    ) -> WTResult<Aggregator<C>> {
        self.options
            .executor()
            .run_map(tokens, chunks, &self.counter)
    }

    /// Count `text`, without state tracking or ranking.
    ///
    /// ## Returns
    /// `None` if `text` holds no tokens; else the total table.
    pub fn count(
        &self,
        text: &str,
    ) -> WTResult<Option<FrequencyTable<C>>> {
        let tokens: Arc<[Token]> = self.tokenizer.tokenize(text).into();
        if tokens.is_empty() {
            return Ok(None);
        }
        let chunks = partition(tokens.len(), self.options.resolve_workers());
        let aggregator = self.map_chunks(&tokens, &chunks)?;
        aggregator.finish().map(Some)
    }

    /// Run the full pipeline over `text`.
    ///
    /// ## Arguments
    /// * `text` - the raw text.
    /// * `top_n` - how many entries to rank.
    ///
    /// ## Returns
    /// [`PipelineOutcome::Empty`] if there are no tokens;
    /// otherwise the [`PipelineReport`].
    pub fn run(
        &self,
        text: &str,
        top_n: NonZeroUsize,
    ) -> WTResult<PipelineOutcome<C>> {
        let mut tracker = StateTracker::default();
        let mut timings = StageTimings::default();

        tracker.advance(PipelineState::Tokenizing)?;
        let t0 = Instant::now();
        let tokens: Arc<[Token]> = self.tokenizer.tokenize(text).into();
        timings.tokenize = t0.elapsed();

        if tokens.is_empty() {
            log::info!("no tokens found in {} bytes of text", text.len());
            tracker.advance(PipelineState::Done)?;
            return Ok(PipelineOutcome::Empty);
        }

        let workers = self.options.resolve_workers();
        log::info!(
            "counting {} tokens with {} worker(s)",
            tokens.len(),
            workers
        );

        tracker.advance(PipelineState::Partitioned)?;
        let chunks = partition(tokens.len(), workers);
        log::debug!(
            "partitioned into {} chunk(s) of at most {} token(s)",
            chunks.len(),
            chunks.first().map_or(0, Chunk::len)
        );

        tracker.advance(PipelineState::MapRunning)?;
        let t0 = Instant::now();
        let aggregator = self
            .map_chunks(&tokens, &chunks)
            .map_err(|e| tracker.fail(e))?;
        timings.map = t0.elapsed();

        tracker.advance(PipelineState::Reducing)?;
        let t0 = Instant::now();
        let total = aggregator.finish().map_err(|e| tracker.fail(e))?;
        timings.reduce = t0.elapsed();

        let t0 = Instant::now();
        let ranked = rank_top_n(&total, top_n);
        timings.rank = t0.elapsed();
        tracker.advance(PipelineState::Ranked)?;

        tracker.advance(PipelineState::Done)?;
        log::info!(
            "{} distinct tokens; timings: {:?}",
            total.len(),
            timings
        );

        Ok(PipelineOutcome::Ranked(PipelineReport {
            ranked,
            total,
            token_count: tokens.len(),
            workers,
            chunks,
            trace: tracker.trace().to_vec(),
            timings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::WorkerError, partition::Chunk};

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn pipeline(workers: usize) -> WordCountPipeline {
        WordCountPipeline::new(WordCountOptions::default().with_workers(Some(nz(workers))))
    }

    struct FailingCounter;

    impl ChunkCounter<u64> for FailingCounter {
        fn count_chunk(
            &self,
            chunk: &Chunk,
            _tokens: &[Token],
        ) -> Result<FrequencyTable<u64>, WorkerError> {
            Err(WorkerError::Failed(format!("chunk {} refused", chunk.index)))
        }
    }

    #[test]
    fn test_transitions() {
        use PipelineState::*;

        assert!(Idle.can_transition_to(Tokenizing));
        assert!(Tokenizing.can_transition_to(Done));
        assert!(MapRunning.can_transition_to(Failed));
        assert!(Reducing.can_transition_to(Failed));

        assert!(!Idle.can_transition_to(MapRunning));
        assert!(!MapRunning.can_transition_to(Ranked));
        assert!(!Partitioned.can_transition_to(Failed));
        assert!(!Done.can_transition_to(Idle));
        assert!(!Failed.can_transition_to(Reducing));

        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Ranked.is_terminal());
    }

    #[test]
    fn test_tracker_rejects_skips() {
        let mut tracker = StateTracker::default();
        assert_eq!(tracker.current(), PipelineState::Idle);

        let err = tracker.advance(PipelineState::Reducing).unwrap_err();
        assert!(matches!(
            err,
            WordtallyError::InvalidTransition {
                from: PipelineState::Idle,
                to: PipelineState::Reducing,
            }
        ));
        assert_eq!(tracker.trace(), &[PipelineState::Idle]);
    }

    #[test]
    fn test_run_scenario() {
        let outcome = pipeline(2)
            .run("The cat sat. The cat ran!", nz(2))
            .unwrap();
        let report = outcome.report().unwrap();

        let ranked: Vec<(&str, u64)> = report
            .ranked
            .iter()
            .map(|e| (e.token.as_str(), e.count))
            .collect();
        assert_eq!(ranked, vec![("cat", 2), ("the", 2)]);

        assert_eq!(report.token_count, 6);
        assert_eq!(report.workers, nz(2));
        assert_eq!(report.total.len(), 4);
        assert_eq!(report.total.get("sat"), 1);
        assert_eq!(report.total.get("ran"), 1);

        use PipelineState::*;
        assert_eq!(
            report.trace,
            vec![Idle, Tokenizing, Partitioned, MapRunning, Reducing, Ranked, Done]
        );
    }

    #[test]
    fn test_run_reports_partition() {
        let text = "a b c d e f g";
        let outcome = pipeline(3).run(text, nz(1)).unwrap();
        let report = outcome.report().unwrap();

        assert_eq!(report.chunks, partition(7, nz(3)));
        let sizes: Vec<usize> = report.chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);

        // More workers than tokens; trailing chunks are empty.
        let outcome = pipeline(5).run("x y", nz(1)).unwrap();
        let report = outcome.report().unwrap();
        let sizes: Vec<usize> = report.chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![1, 1, 0, 0, 0]);
        assert_eq!(report.total.get("x"), 1);
        assert_eq!(report.total.get("y"), 1);
    }

    #[test]
    fn test_run_empty() {
        let outcome = pipeline(4).run("  ...!?  ", nz(10)).unwrap();
        assert!(matches!(outcome, PipelineOutcome::Empty));
        assert!(outcome.report().is_none());

        assert!(pipeline(4).count("").unwrap().is_none());
    }

    #[test]
    fn test_run_worker_failure() {
        let pipeline = pipeline(3).with_counter(Arc::new(FailingCounter));

        let err = pipeline.run("a b c d e f", nz(3)).unwrap_err();
        assert_eq!(err.failed_chunks(), vec![0, 1, 2]);

        assert!(pipeline.count("a b c").is_err());
    }

    #[test]
    fn test_count() {
        let total = pipeline(3).count("b a b c b").unwrap().unwrap();
        assert_eq!(total.get("b"), 3);
        assert_eq!(total.get("a"), 1);
        assert_eq!(total.get("c"), 1);
    }

    #[test]
    fn test_narrow_counts() {
        let pipeline: WordCountPipeline<u16> =
            WordCountPipeline::new(WordCountOptions::default().with_workers(Some(nz(2))));

        let outcome = pipeline.run("x y x", nz(1)).unwrap();
        let report = outcome.report().unwrap();
        assert_eq!(report.ranked.entries[0].token.as_str(), "x");
        assert_eq!(report.ranked.entries[0].count, 2u16);
    }
}
