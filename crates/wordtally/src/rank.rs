//! # Ranker
//!
//! Ranked order is count descending; ties are broken by token
//! lexicographic ascending. Since tokens in a table are distinct,
//! this is a total order, and the ranking of a table is unique.

use core::cmp::Ordering;
use std::num::NonZeroUsize;

use dary_heap::OctonaryHeap;

use crate::{counting::FrequencyTable, token::Token, types::CountType};

/// A ``(token, count)`` pair in ranked output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RankedEntry<C: CountType = u64> {
    /// The word.
    pub token: Token,

    /// The number of occurrences.
    pub count: C,
}

/// Compare entries in ranked order; `Less` ranks first.
pub fn rank_order<C: CountType>(
    a: (&Token, C),
    b: (&Token, C),
) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

/// Heap entry; the greatest element is the lowest-ranked.
struct HeapEntry<'a, C: CountType> {
    token: &'a Token,
    count: C,
}

impl<C: CountType> PartialEq for HeapEntry<'_, C> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<C: CountType> Eq for HeapEntry<'_, C> {}

impl<C: CountType> PartialOrd for HeapEntry<'_, C> {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: CountType> Ord for HeapEntry<'_, C> {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        rank_order((self.token, self.count), (other.token, other.count))
    }
}

/// The output of the ranker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedList<C: CountType = u64> {
    /// The number of entries requested; `None` for a full ranking.
    pub requested: Option<NonZeroUsize>,

    /// The entries, best first.
    pub entries: Vec<RankedEntry<C>>,
}

impl<C: CountType> RankedList<C> {
    /// The number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the list empty? An empty list means "nothing to show".
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries, best first.
    pub fn iter(&self) -> core::slice::Iter<'_, RankedEntry<C>> {
        self.entries.iter()
    }

    /// The largest count; or `None` if empty.
    pub fn max_count(&self) -> Option<C> {
        self.entries.first().map(|e| e.count)
    }
}

impl<'a, C: CountType> IntoIterator for &'a RankedList<C> {
    type Item = &'a RankedEntry<C>;
    type IntoIter = core::slice::Iter<'a, RankedEntry<C>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Select the `n` highest-ranked entries of `table`.
///
/// ## Returns
/// ``min(n, table.len())`` entries, best first; empty for an empty table.
pub fn rank_top_n<C: CountType>(
    table: &FrequencyTable<C>,
    n: NonZeroUsize,
) -> RankedList<C> {
    let n = n.get();
    let mut heap: OctonaryHeap<HeapEntry<'_, C>> = OctonaryHeap::with_capacity(n.min(table.len()) + 1);

    for (token, count) in table.iter() {
        let entry = HeapEntry {
            token,
            count: *count,
        };
        if heap.len() < n {
            heap.push(entry);
        } else if heap.peek().is_some_and(|worst| entry < *worst) {
            heap.pop();
            heap.push(entry);
        }
    }

    // Popping yields worst first.
    let mut entries = Vec::with_capacity(heap.len());
    while let Some(entry) = heap.pop() {
        entries.push(RankedEntry {
            token: entry.token.clone(),
            count: entry.count,
        });
    }
    entries.reverse();

    RankedList {
        requested: NonZeroUsize::new(n),
        entries,
    }
}

/// Rank every entry of `table`.
pub fn rank_all<C: CountType>(table: &FrequencyTable<C>) -> RankedList<C> {
    let mut entries: Vec<RankedEntry<C>> = table
        .iter()
        .map(|(token, count)| RankedEntry {
            token: token.clone(),
            count: *count,
        })
        .collect();
    entries.sort_unstable_by(|a, b| rank_order((&a.token, a.count), (&b.token, b.count)));

    RankedList {
        requested: None,
        entries,
    }
}
