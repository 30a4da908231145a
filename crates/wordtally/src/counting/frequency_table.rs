//! # Frequency Tables

use core::fmt::Debug;

use crate::{
    token::Token,
    types::{CountType, WTHashIntoIter, WTHashIter, WTHashMap, hash_map_with_capacity},
};

/// A count exceeded the capacity of the count type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("count overflow for token {token:?}")]
pub struct CountOverflow {
    /// The token whose count overflowed.
    pub token: String,
}

/// A ``{ Token -> count }`` table.
///
/// Used both for the partial tables built by each map stage worker,
/// and for the merged total table.
#[derive(Clone)]
pub struct FrequencyTable<C: CountType = u64> {
    counts: WTHashMap<Token, C>,
}

impl<C: CountType> Default for FrequencyTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: CountType> Debug for FrequencyTable<C> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        // Sorted; so debug output is stable across hashers.
        f.debug_map().entries(self.sorted_entries()).finish()
    }
}

impl<C: CountType> PartialEq for FrequencyTable<C> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(token, count)| other.counts.get(token) == Some(count))
    }
}

impl<C: CountType> Eq for FrequencyTable<C> {}

impl<C: CountType> FrequencyTable<C> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty table with room for `capacity` distinct tokens.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: hash_map_with_capacity(capacity),
        }
    }

    /// The number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The count for `word`; zero if absent.
    pub fn get(
        &self,
        word: &str,
    ) -> C {
        self.counts.get(word).copied().unwrap_or_else(C::zero)
    }

    /// Does the table contain `word`?
    pub fn contains(
        &self,
        word: &str,
    ) -> bool {
        self.counts.contains_key(word)
    }

    /// Add `count` to the entry for `token`.
    ///
    /// Adding zero to an absent token still creates the entry.
    pub fn add(
        &mut self,
        token: &Token,
        count: C,
    ) -> Result<(), CountOverflow> {
        match self.counts.get_mut(token) {
            Some(current) => {
                *current = current.checked_add(&count).ok_or_else(|| CountOverflow {
                    token: token.to_string(),
                })?;
            }
            None => {
                self.counts.insert(token.clone(), count);
            }
        }
        Ok(())
    }

    /// Add one to the entry for `token`.
    pub fn increment(
        &mut self,
        token: &Token,
    ) -> Result<(), CountOverflow> {
        self.add(token, C::one())
    }

    /// Sum every entry of `other` into this table.
    pub fn merge_from(
        &mut self,
        other: &FrequencyTable<C>,
    ) -> Result<(), CountOverflow> {
        self.counts.reserve(other.len());
        for (token, count) in other.iter() {
            self.add(token, *count)?;
        }
        Ok(())
    }

    /// The sum of all counts.
    ///
    /// Returns `None` on overflow.
    pub fn total(&self) -> Option<C> {
        self.counts
            .values()
            .try_fold(C::zero(), |acc, c| acc.checked_add(c))
    }

    /// Iterate over the entries; in hash order.
    pub fn iter(&self) -> WTHashIter<'_, Token, C> {
        self.counts.iter()
    }

    /// The entries sorted by token.
    pub fn sorted_entries(&self) -> Vec<(&Token, C)> {
        let mut entries: Vec<(&Token, C)> = self.iter().map(|(t, c)| (t, *c)).collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<C: CountType> IntoIterator for FrequencyTable<C> {
    type Item = (Token, C);
    type IntoIter = WTHashIntoIter<Token, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

impl<'a, C: CountType> IntoIterator for &'a FrequencyTable<C> {
    type Item = (&'a Token, &'a C);
    type IntoIter = WTHashIter<'a, Token, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
