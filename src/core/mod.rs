//! Record and key types shared by the basket and genre jobs.

use crate::errors::RecordError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One raw line of job input, tagged with where it came from.
///
/// Lines that are not valid UTF-8 are still carried, with lossy text, so
/// that the job rejects them one at a time instead of failing the read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputLine {
    pub origin: Arc<str>,
    pub number: u64,
    pub text: String,
    utf8: bool,
}

impl InputLine {
    pub fn new(origin: Arc<str>, number: u64, text: impl Into<String>) -> Self {
        Self {
            origin,
            number,
            text: text.into(),
            utf8: true,
        }
    }

    /// Decode raw bytes, keeping lines that are not valid UTF-8.
    pub fn from_bytes(origin: Arc<str>, number: u64, bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::new(origin, number, text),
            Err(_) => Self {
                origin,
                number,
                text: String::from_utf8_lossy(bytes).into_owned(),
                utf8: false,
            },
        }
    }

    pub fn is_valid_utf8(&self) -> bool {
        self.utf8
    }

    /// The line text, or a record error if the bytes did not decode.
    pub fn decoded(&self) -> Result<&str, RecordError> {
        if self.utf8 {
            Ok(&self.text)
        } else {
            Err(self.reject("invalid UTF-8"))
        }
    }

    /// Build a record-level error pointing at this line.
    pub fn reject(&self, reason: impl Into<String>) -> RecordError {
        RecordError::new(self.origin.as_ref(), self.number, &self.text, reason)
    }
}

/// A single purchase: `customer_id,date,item`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub customer_id: String,
    pub date: String,
    pub item: String,
}

impl TransactionRecord {
    pub const FIELD_COUNT: usize = 3;

    /// Parse a line with exactly three comma-separated fields.
    ///
    /// Fields are taken verbatim; item names may contain spaces but not commas.
    pub fn parse(line: &InputLine) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.decoded()?.split(',').collect();
        match fields.as_slice() {
            [customer_id, date, item] => Ok(Self {
                customer_id: (*customer_id).to_string(),
                date: (*date).to_string(),
                item: (*item).to_string(),
            }),
            _ => Err(line.reject(format!(
                "expected {} comma-separated fields, found {}",
                Self::FIELD_COUNT,
                fields.len()
            ))),
        }
    }

    pub fn session_key(&self) -> SessionKey {
        SessionKey {
            customer_id: self.customer_id.clone(),
            date: self.date.clone(),
        }
    }
}

/// One shopping basket: a customer on a date.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub customer_id: String,
    pub date: String,
}

impl SessionKey {
    pub fn new(customer_id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            date: date.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.customer_id, self.date)
    }
}

/// Distinct items of one session, sorted by name.
///
/// Sorting replaces set iteration order so that pair generation is
/// reproducible.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemSet(Vec<String>);

impl ItemSet {
    /// Deduplicate and sort a raw item list.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut items: Vec<String> = items.into_iter().collect();
        items.sort_unstable();
        items.dedup();
        Self(items)
    }

    pub fn items(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All unordered pairs `(a, b)` with `a < b`, in lexicographic order.
    ///
    /// A set of `n` items yields `n * (n - 1) / 2` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().enumerate().flat_map(move |(i, first)| {
            self.0[i + 1..]
                .iter()
                .map(move |second| (first.as_str(), second.as_str()))
        })
    }
}

/// A directed co-occurrence edge: `partner` was bought together with `item`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemPair {
    pub item: String,
    pub partner: String,
}

impl ItemPair {
    pub fn new(item: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            partner: partner.into(),
        }
    }

    pub fn reversed(&self) -> Self {
        Self {
            item: self.partner.clone(),
            partner: self.item.clone(),
        }
    }
}

impl fmt::Display for ItemPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.item, self.partner)
    }
}

/// Number of sessions in which an ordered pair co-occurred.
pub type PairCount = u64;

/// Terminal record: the most frequent partner of `item`.
///
/// Under the `all` tie policy an item has one record per tied partner.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cooccurrence {
    pub item: String,
    pub partner: String,
    pub count: PairCount,
}

impl Cooccurrence {
    pub fn new(item: impl Into<String>, partner: impl Into<String>, count: PairCount) -> Self {
        Self {
            item: item.into(),
            partner: partner.into(),
            count,
        }
    }
}

/// Grouping key of the genre job.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenreYear {
    pub year: String,
    pub genre: String,
}

/// Number of distinct titles released in `year` under `genre`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenreCount {
    pub year: String,
    pub genre: String,
    pub titles: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> InputLine {
        InputLine::new(Arc::from("test"), 1, text)
    }

    #[test]
    fn test_parse_transaction() {
        let record = TransactionRecord::parse(&line("1,2022-10-31,candy corn")).unwrap();
        assert_eq!(record.customer_id, "1");
        assert_eq!(record.date, "2022-10-31");
        assert_eq!(record.item, "candy corn");
        assert_eq!(record.session_key(), SessionKey::new("1", "2022-10-31"));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let err = TransactionRecord::parse(&line("1,2022-10-31")).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.reason.contains("found 2"));

        let err = TransactionRecord::parse(&line("1,2022-10-31,eggs,extra")).unwrap_err();
        assert!(err.reason.contains("found 4"));
    }

    #[test]
    fn test_parse_rejects_undecodable_line() {
        let bad = InputLine::from_bytes(Arc::from("test"), 3, b"2,d,\xff\xfe");
        assert!(!bad.is_valid_utf8());

        let err = TransactionRecord::parse(&bad).unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.reason, "invalid UTF-8");

        let good = InputLine::from_bytes(Arc::from("test"), 1, "1,d,crème".as_bytes());
        assert_eq!(TransactionRecord::parse(&good).unwrap().item, "crème");
    }

    #[test]
    fn test_item_set_sorts_and_dedups() {
        let set = ItemSet::from_items(
            ["pumpkins", "eggs", "chocolates", "eggs"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(set.items(), &["chocolates", "eggs", "pumpkins"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_item_set_pairs() {
        let set = ItemSet::from_items(["c", "a", "b"].into_iter().map(String::from));
        let pairs: Vec<_> = set.pairs().collect();
        assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
    }

    #[test]
    fn test_item_set_pairs_small_sets() {
        assert_eq!(ItemSet::default().pairs().count(), 0);
        let single = ItemSet::from_items(vec!["eggs".to_string()]);
        assert_eq!(single.pairs().count(), 0);
    }

    #[test]
    fn test_item_pair_reversed() {
        let pair = ItemPair::new("eggs", "pumpkins");
        assert_eq!(pair.reversed(), ItemPair::new("pumpkins", "eggs"));
    }
}
