//! The map/reduce job contract.

use crate::errors::RecordError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One map/shuffle/reduce stage.
///
/// The executor calls `map` once per input record, groups every emitted
/// `(Key, Value)` pair by key, and calls `reduce` once per distinct key with
/// all of that key's values. Stages hold no state between calls, so records
/// and keys may be processed on any thread in any order.
///
/// Keys and values must be serializable because the shuffle may spill them
/// to disk.
pub trait MapReduce: Send + Sync {
    type Input: Send;
    type Key: Ord + Clone + Send + Sync + Serialize + DeserializeOwned;
    type Value: Send + Sync + Serialize + DeserializeOwned;
    type Output: Send;

    /// Label used in logs, counters, and error messages.
    fn name(&self) -> &'static str;

    /// Expand one record into zero or more key/value pairs.
    fn map(&self, input: Self::Input) -> Result<Vec<(Self::Key, Self::Value)>, RecordError>;

    /// Whether `combine` may be applied to map output before the shuffle.
    fn has_combiner(&self) -> bool {
        false
    }

    /// Pre-aggregate part of one key's values on the map side.
    ///
    /// Only valid when the reduction is associative and commutative; the
    /// result is fed to `reduce` together with other partial results.
    fn combine(&self, _key: &Self::Key, values: Vec<Self::Value>) -> Vec<Self::Value> {
        values
    }

    /// Aggregate all values of one key.
    fn reduce(&self, key: Self::Key, values: Vec<Self::Value>) -> Vec<Self::Output>;
}
