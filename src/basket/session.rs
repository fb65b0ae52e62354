//! Stage 1: group transaction lines into per-session item sets.

use crate::core::{InputLine, ItemSet, SessionKey, TransactionRecord};
use crate::errors::RecordError;
use crate::mapreduce::MapReduce;

/// Maps each `customer_id,date,item` line to `(session, item)` and reduces
/// each session's items to a sorted, duplicate-free [`ItemSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionGrouper;

impl MapReduce for SessionGrouper {
    type Input = InputLine;
    type Key = SessionKey;
    type Value = String;
    type Output = (SessionKey, ItemSet);

    fn name(&self) -> &'static str {
        "session-grouper"
    }

    fn map(&self, line: InputLine) -> Result<Vec<(SessionKey, String)>, RecordError> {
        let record = TransactionRecord::parse(&line)?;
        let session = record.session_key();
        Ok(vec![(session, record.item)])
    }

    fn reduce(&self, session: SessionKey, items: Vec<String>) -> Vec<(SessionKey, ItemSet)> {
        vec![(session, ItemSet::from_items(items))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_map_emits_session_and_item() {
        let line = InputLine::new(Arc::from("t"), 1, "1,2022-10-31,chocolates");
        let emitted = SessionGrouper.map(line).unwrap();
        assert_eq!(
            emitted,
            vec![(SessionKey::new("1", "2022-10-31"), "chocolates".to_string())]
        );
    }

    #[test]
    fn test_map_rejects_malformed_line() {
        let line = InputLine::new(Arc::from("t"), 9, "1;2022-10-31;chocolates");
        let err = SessionGrouper.map(line).unwrap_err();
        assert_eq!(err.line, 9);
        assert_eq!(err.content, "1;2022-10-31;chocolates");
    }

    #[test]
    fn test_reduce_deduplicates_repeat_purchases() {
        let session = SessionKey::new("1", "2022-10-31");
        let items = ["pumpkins", "eggs", "pumpkins", "chocolates"]
            .into_iter()
            .map(String::from)
            .collect();

        let output = SessionGrouper.reduce(session.clone(), items);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].0, session);
        assert_eq!(output[0].1.items(), &["chocolates", "eggs", "pumpkins"]);
    }
}
