//! Stage 3: pick each item's most frequent partner.

use crate::config::TiePolicy;
use crate::core::{Cooccurrence, ItemPair, PairCount};
use crate::errors::RecordError;
use crate::mapreduce::MapReduce;

/// Re-keys pair counts by their first item and keeps the partner(s) with the
/// highest count, according to the configured [`TiePolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxCooccurrenceSelector {
    policy: TiePolicy,
}

impl MaxCooccurrenceSelector {
    pub fn new(policy: TiePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TiePolicy {
        self.policy
    }
}

/// Select the best partners of `item` from `(partner, count)` candidates.
///
/// Winners are ordered by partner name. An empty candidate list selects
/// nothing.
pub fn select_most_frequent(
    item: &str,
    candidates: Vec<(String, PairCount)>,
    policy: TiePolicy,
) -> Vec<Cooccurrence> {
    let Some(max_count) = candidates.iter().map(|(_, count)| *count).max() else {
        return Vec::new();
    };

    let mut winners: Vec<String> = candidates
        .into_iter()
        .filter(|(_, count)| *count == max_count)
        .map(|(partner, _)| partner)
        .collect();
    winners.sort_unstable();
    winners.dedup();

    if policy == TiePolicy::Smallest {
        winners.truncate(1);
    }

    winners
        .into_iter()
        .map(|partner| Cooccurrence::new(item, partner, max_count))
        .collect()
}

impl MapReduce for MaxCooccurrenceSelector {
    type Input = (ItemPair, PairCount);
    type Key = String;
    type Value = (String, PairCount);
    type Output = Cooccurrence;

    fn name(&self) -> &'static str {
        "max-cooccurrence-selector"
    }

    fn map(
        &self,
        (pair, count): (ItemPair, PairCount),
    ) -> Result<Vec<(String, (String, PairCount))>, RecordError> {
        Ok(vec![(pair.item, (pair.partner, count))])
    }

    fn reduce(&self, item: String, candidates: Vec<(String, PairCount)>) -> Vec<Cooccurrence> {
        select_most_frequent(&item, candidates, self.policy)
    }
}
