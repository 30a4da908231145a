//! # Counting
//!
//! The map stage ([`ChunkCounter`] workers building partial
//! [`FrequencyTable`]s) and the reduce stage ([`Aggregator`]).

mod aggregate;
mod frequency_table;
mod worker;

#[doc(inline)]
pub use aggregate::{Aggregator, merge_tables};
#[doc(inline)]
pub use frequency_table::{CountOverflow, FrequencyTable};
#[doc(inline)]
pub use worker::{ChunkCounter, TokenCounter, count_tokens, sequential_count};
