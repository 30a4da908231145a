//! # Reduce Stage

use crate::{
    counting::FrequencyTable,
    errors::{WTResult, WordtallyError},
    types::CountType,
};

/// Collects one partial table per chunk; then merges them.
///
/// Partial tables may arrive in any order, but are always merged
/// in ascending chunk index order. [`Aggregator::finish`] refuses
/// to merge an incomplete set.
#[derive(Debug)]
pub struct Aggregator<C: CountType = u64> {
    slots: Vec<Option<FrequencyTable<C>>>,
    received: usize,
}

impl<C: CountType> Aggregator<C> {
    /// Create an aggregator expecting `expected_chunks` partial tables.
    pub fn new(expected_chunks: usize) -> Self {
        Self {
            slots: (0..expected_chunks).map(|_| None).collect(),
            received: 0,
        }
    }

    /// The number of partial tables expected.
    pub fn expected(&self) -> usize {
        self.slots.len()
    }

    /// The number of partial tables received.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Have all partial tables been received?
    pub fn is_complete(&self) -> bool {
        self.received == self.slots.len()
    }

    /// The chunk indices which have not reported, in ascending order.
    pub fn missing_chunks(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.is_none().then_some(idx))
            .collect()
    }

    /// Accept the partial table for chunk `index`.
    ///
    /// ## Errors
    /// [`WordtallyError::AggregationPrecondition`] if `index` is out of range,
    /// or the chunk has already reported.
    pub fn accept(
        &mut self,
        index: usize,
        table: FrequencyTable<C>,
    ) -> WTResult<()> {
        let expected = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            WordtallyError::AggregationPrecondition(format!(
                "chunk index {index} out of range for {expected} chunks"
            ))
        })?;

        if slot.is_some() {
            return Err(WordtallyError::AggregationPrecondition(format!(
                "duplicate result for chunk {index}"
            )));
        }

        *slot = Some(table);
        self.received += 1;
        Ok(())
    }

    /// Merge all partial tables into the total table.
    ///
    /// ## Errors
    /// * [`WordtallyError::AggregationPrecondition`] if any chunk has not reported.
    /// * [`WordtallyError::CountOverflow`] if a summed count overflows `C`.
    pub fn finish(self) -> WTResult<FrequencyTable<C>> {
        if !self.is_complete() {
            return Err(WordtallyError::AggregationPrecondition(format!(
                "missing results for chunks {:?}",
                self.missing_chunks()
            )));
        }

        merge_tables(self.slots.into_iter().flatten())
    }
}

/// Sum a complete, ordered sequence of partial tables.
///
/// The first table is reused as the accumulator; the rest are merged
/// into it in iteration order.
pub fn merge_tables<C, I>(tables: I) -> WTResult<FrequencyTable<C>>
where
    C: CountType,
    I: IntoIterator<Item = FrequencyTable<C>>,
{
    let mut tables = tables.into_iter();
    let mut total = match tables.next() {
        Some(first) => first,
        None => return Ok(FrequencyTable::new()),
    };

    for table in tables {
        total
            .merge_from(&table)
            .map_err(|e| WordtallyError::CountOverflow { token: e.token })?;
    }

    log::debug!("merged total table: {} distinct tokens", total.len());
    Ok(total)
}
