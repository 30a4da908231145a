//! # Partitioner
//!
//! Splits a token sequence into exactly `W` contiguous chunks of
//! ``ceil(len / W)`` tokens; the final chunks may be shorter, or empty.

use core::ops::Range;
use std::num::NonZeroUsize;

use crate::token::Token;

/// A contiguous view of the token sequence, assigned to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The position of this chunk in the partition.
    pub index: usize,

    /// The token range covered by this chunk.
    pub range: Range<usize>,
}

impl Chunk {
    /// The number of tokens in the chunk.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Is the chunk empty?
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// View the chunk's tokens.
    ///
    /// ## Panics
    /// If `tokens` is not the sequence this chunk was partitioned from.
    pub fn slice<'a>(
        &self,
        tokens: &'a [Token],
    ) -> &'a [Token] {
        &tokens[self.range.clone()]
    }
}

/// The chunk size for `len` tokens over `workers` chunks.
pub fn chunk_size(
    len: usize,
    workers: NonZeroUsize,
) -> usize {
    len.div_ceil(workers.get())
}

/// Partition a token sequence of length `len` into `workers` chunks.
///
/// ## Returns
/// Exactly `workers` chunks, in index order, which tile ``0..len``
/// without gaps or overlap.
pub fn partition(
    len: usize,
    workers: NonZeroUsize,
) -> Vec<Chunk> {
    let size = chunk_size(len, workers);

    (0..workers.get())
        .map(|index| {
            let start = (index * size).min(len);
            let end = (start + size).min(len);
            Chunk {
                index,
                range: start..end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(0, nz(4)), 0);
        assert_eq!(chunk_size(6, nz(2)), 3);
        assert_eq!(chunk_size(7, nz(2)), 4);
        assert_eq!(chunk_size(3, nz(8)), 1);
    }

    #[test]
    fn test_partition_even() {
        let chunks = partition(6, nz(2));
        assert_eq!(
            chunks,
            vec![
                Chunk {
                    index: 0,
                    range: 0..3
                },
                Chunk {
                    index: 1,
                    range: 3..6
                },
            ]
        );
    }

    #[test]
    fn test_partition_short_tail() {
        let chunks = partition(10, nz(4));
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_partition_more_workers_than_tokens() {
        let chunks = partition(3, nz(8));
        assert_eq!(chunks.len(), 8);

        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 0, 0, 0, 0, 0]);

        for (idx, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, idx);
        }
        assert!(chunks[7].is_empty());
    }

    #[test]
    fn test_partition_empty() {
        let chunks = partition(0, nz(3));
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.is_empty()));
    }

    #[test]
    fn test_slice() {
        let tokens = tokenize("The cat sat. The cat ran!");
        let chunks = partition(tokens.len(), nz(2));

        let first: Vec<&str> = chunks[0].slice(&tokens).iter().map(|t| t.as_str()).collect();
        let second: Vec<&str> = chunks[1].slice(&tokens).iter().map(|t| t.as_str()).collect();
        assert_eq!(first, vec!["the", "cat", "sat"]);
        assert_eq!(second, vec!["the", "cat", "ran"]);
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(1000))]

        #[test]
        fn partition_is_complete(len in 0usize..500, workers in 1usize..40) {
            let chunks = partition(len, nz(workers));
            proptest::prop_assert_eq!(chunks.len(), workers);

            let mut expected_start = 0;
            for (idx, chunk) in chunks.iter().enumerate() {
                proptest::prop_assert_eq!(chunk.index, idx);
                proptest::prop_assert_eq!(chunk.range.start, expected_start);
                expected_start = chunk.range.end;
            }
            proptest::prop_assert_eq!(expected_start, len);
        }

        #[test]
        fn concatenated_chunks_reproduce_tokens(
            text in "[a-z ,.]{0,200}",
            workers in 1usize..16,
        ) {
            let tokens = tokenize(&text);
            let chunks = partition(tokens.len(), nz(workers));

            let joined: Vec<Token> = chunks
                .iter()
                .flat_map(|c| c.slice(&tokens).iter().cloned())
                .collect();
            proptest::prop_assert_eq!(joined, tokens);
        }
    }
}
