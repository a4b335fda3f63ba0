use crate::error::MissingFieldError;
use crate::input::InputSplit;
use crate::record::Record;
use anyhow::Result;

/// One map/shuffle/reduce job over line-delimited JSON records.
///
/// `map` derives intermediate (key, value) pairs from one record; the runner
/// groups everything emitted under a key and hands the values to `reduce` in
/// arrival order. Implementations hold configuration only. All per-key state
/// lives in locals inside `reduce`, so a single instance serves every key,
/// partition, and run.
pub trait MapReduce: Sync {
    /// Intermediate value attached to each emitted key.
    type Value: Send;

    /// Derive zero or more (key, value) pairs from one parsed record.
    /// `split` identifies the input file the record came from. Returning
    /// `MissingFieldError` skips the record (counted, never fatal) and
    /// discards anything already emitted for it.
    fn map(
        &self,
        record: &Record,
        split: &InputSplit,
        emit: &mut dyn FnMut(String, Self::Value),
    ) -> Result<(), MissingFieldError>;

    /// Whether [`MapReduce::combine`] runs per input split before grouping.
    /// Enable only when pre-folding cannot change final output, i.e. when
    /// reducing combined values equals reducing the raw values.
    fn has_combiner(&self) -> bool {
        false
    }

    /// Local pre-fold of one key's values within a single input split.
    fn combine(&self, _key: &str, values: Vec<Self::Value>) -> Vec<Self::Value> {
        values
    }

    /// Fold all values grouped under `key` into zero or more output records.
    /// `values` yields each grouped value exactly once, in arrival order;
    /// `out` writes one `key\tvalue` output line per call.
    fn reduce(
        &self,
        key: &str,
        values: &mut dyn Iterator<Item = Self::Value>,
        out: &mut dyn FnMut(&str, &str) -> Result<()>,
    ) -> Result<()>;
}
