//! Stage 2: count how many sessions each ordered item pair appears in.

use crate::core::{ItemPair, ItemSet, PairCount, SessionKey};
use crate::errors::RecordError;
use crate::mapreduce::MapReduce;

/// Expands a session's items into directed pairs and sums them.
///
/// Every unordered pair `{a, b}` is emitted in both directions, so a session
/// of `n` distinct items emits `n * (n - 1)` pairs and the final counts are
/// symmetric. Summation is associative, so the stage provides a combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairCounter;

/// Directed pairs of one session, each with a count of one.
pub fn session_pairs(items: &ItemSet) -> Vec<(ItemPair, PairCount)> {
    let mut pairs = Vec::with_capacity(items.len() * items.len().saturating_sub(1));
    for (first, second) in items.pairs() {
        pairs.push((ItemPair::new(first, second), 1));
        pairs.push((ItemPair::new(second, first), 1));
    }
    pairs
}

impl MapReduce for PairCounter {
    type Input = (SessionKey, ItemSet);
    type Key = ItemPair;
    type Value = PairCount;
    type Output = (ItemPair, PairCount);

    fn name(&self) -> &'static str {
        "pair-counter"
    }

    fn map(
        &self,
        (_session, items): (SessionKey, ItemSet),
    ) -> Result<Vec<(ItemPair, PairCount)>, RecordError> {
        Ok(session_pairs(&items))
    }

    fn has_combiner(&self) -> bool {
        true
    }

    fn combine(&self, _pair: &ItemPair, counts: Vec<PairCount>) -> Vec<PairCount> {
        vec![counts.into_iter().sum()]
    }

    fn reduce(&self, pair: ItemPair, counts: Vec<PairCount>) -> Vec<(ItemPair, PairCount)> {
        vec![(pair, counts.into_iter().sum())]
    }
}
