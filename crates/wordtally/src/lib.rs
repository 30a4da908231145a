//! # `wordtally` Parallel Word Counting
//!
//! `wordtally` tokenizes a body of text and counts word frequencies with a
//! map/reduce pipeline over native threads; then ranks the top-N words.
//!
//! See:
//! * [`tokenize`] to normalize raw text into [`Token`]s.
//! * [`partition`] to split a token sequence into per-worker [`Chunk`]s.
//! * [`counting`] for [`FrequencyTable`]s, the map stage workers, and the [`Aggregator`].
//! * [`concurrency`] for the map stage executors.
//! * [`rank`] to select the top-N words.
//! * [`pipeline`] to drive the whole thing.
//! * [`source`] to fetch source texts.
//!
//! ## Counting Words
//!
//! ```rust
//! use std::num::NonZeroUsize;
//!
//! use wordtally::{PipelineOutcome, WordCountOptions, WordCountPipeline};
//!
//! let options = WordCountOptions::default().with_workers(NonZeroUsize::new(2));
//! let pipeline: WordCountPipeline = WordCountPipeline::new(options);
//!
//! let top_n = NonZeroUsize::new(2).unwrap();
//! match pipeline.run("The cat sat. The cat ran!", top_n).unwrap() {
//!     PipelineOutcome::Empty => println!("No words found."),
//!     PipelineOutcome::Ranked(report) => {
//!         let words: Vec<(&str, u64)> = report
//!             .ranked
//!             .iter()
//!             .map(|e| (e.token.as_str(), e.count))
//!             .collect();
//!         assert_eq!(words, vec![("cat", 2), ("the", 2)]);
//!     }
//! }
//! ```
//!
//! ## Crate Features
//!
#![doc = document_features::document_features!()]
#![warn(missing_docs, unused)]

pub mod concurrency;
pub mod counting;
pub mod errors;
pub mod partition;
pub mod pipeline;
pub mod rank;
pub mod source;
pub mod token;
pub mod tokenize;
pub mod types;

#[cfg(feature = "download")]
#[doc(inline)]
pub use wordtally_cache as cache;

#[doc(inline)]
pub use concurrency::{MapBackend, MapExecutor};
#[doc(inline)]
pub use counting::{Aggregator, ChunkCounter, FrequencyTable, TokenCounter};
#[doc(inline)]
pub use errors::{ChunkFailure, FetchError, WTResult, WorkerError, WordtallyError};
#[doc(inline)]
pub use partition::{Chunk, partition};
#[doc(inline)]
pub use pipeline::{PipelineOutcome, PipelineReport, PipelineState, WordCountOptions, WordCountPipeline};
#[doc(inline)]
pub use rank::{RankedEntry, RankedList, rank_all, rank_top_n};
#[doc(inline)]
pub use source::{DefaultTextSource, SourceLocator, SourceOptions, TextSource};
#[doc(inline)]
pub use token::Token;
#[doc(inline)]
pub use tokenize::{TextTokenizer, tokenize};
#[doc(inline)]
pub use types::CountType;
