//! # Map Stage Workers

use crate::{
    counting::{CountOverflow, FrequencyTable},
    errors::WorkerError,
    partition::Chunk,
    token::Token,
    tokenize::TextTokenizer,
    types::CountType,
};

/// Typical distinct-to-total token ratio in natural language text.
///
/// Used when pre-allocating partial tables.
const EXPECTED_DISTINCT_RATIO: usize = 8;

/// A map stage counting function.
///
/// Implementations must be pure functions of the chunk;
/// they are run concurrently, one call per chunk, and never share
/// mutable state with each other.
pub trait ChunkCounter<C: CountType>: Send + Sync {
    /// Count the tokens of one chunk into a fresh partial table.
    ///
    /// ## Arguments
    /// * `chunk` - the chunk being counted.
    /// * `tokens` - the chunk's tokens; ``chunk.slice(&all_tokens)``.
    fn count_chunk(
        &self,
        chunk: &Chunk,
        tokens: &[Token],
    ) -> Result<FrequencyTable<C>, WorkerError>;
}

/// The standard [`ChunkCounter`]: one increment per token.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenCounter;

impl<C: CountType> ChunkCounter<C> for TokenCounter {
    fn count_chunk(
        &self,
        _chunk: &Chunk,
        tokens: &[Token],
    ) -> Result<FrequencyTable<C>, WorkerError> {
        count_tokens(tokens).map_err(|e| WorkerError::CountOverflow(e.token))
    }
}

/// Count a token sequence in a single pass.
///
/// This is the sequential reference for the parallel pipeline;
/// and the body of [`TokenCounter`].
pub fn count_tokens<'a, C, I>(tokens: I) -> Result<FrequencyTable<C>, CountOverflow>
where
    C: CountType,
    I: IntoIterator<Item = &'a Token>,
{
    let tokens = tokens.into_iter();
    let (lower, _) = tokens.size_hint();

    let mut table = FrequencyTable::with_capacity(lower / EXPECTED_DISTINCT_RATIO);
    for token in tokens {
        table.increment(token)?;
    }
    Ok(table)
}

/// Tokenize and count `text` in one pass; no token sequence is built.
///
/// A reference for checking the parallel pipeline.
pub fn sequential_count<C: CountType>(text: &str) -> Result<FrequencyTable<C>, CountOverflow> {
    let tokenizer = TextTokenizer::new();
    let lowered = text.to_lowercase();

    let mut table = FrequencyTable::new();
    for token in tokenizer.tokenize_iter(&lowered) {
        table.increment(&token)?;
    }
    Ok(table)
}
