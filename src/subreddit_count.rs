//! Counting job: how many records each input file contributed per subreddit.

use crate::error::MissingFieldError;
use crate::input::InputSplit;
use crate::mapred::MapReduce;
use crate::record::Record;
use anyhow::Result;

/// Tallies records per (input file, subreddit) pair. Keys are
/// `"<file name> <subreddit>"` (single space); each record contributes one
/// unit; the reduce stage sums. Because summation is associative and
/// commutative, the same fold doubles as a per-split combiner, on by default.
#[derive(Clone, Debug)]
pub struct SubredditCount {
    combine: bool,
}

impl SubredditCount {
    pub fn new() -> Self {
        Self { combine: true }
    }

    /// Disable the per-split pre-fold: every unit increment then travels to
    /// the reduce stage as emitted. Output must not change either way.
    pub fn without_combiner() -> Self {
        Self { combine: false }
    }
}

impl Default for SubredditCount {
    fn default() -> Self {
        Self::new()
    }
}

impl MapReduce for SubredditCount {
    type Value = u64;

    fn map(
        &self,
        record: &Record,
        split: &InputSplit,
        emit: &mut dyn FnMut(String, u64),
    ) -> Result<(), MissingFieldError> {
        let subreddit = record.subreddit()?;
        emit(format!("{} {}", split.name, subreddit), 1);
        Ok(())
    }

    fn has_combiner(&self) -> bool {
        self.combine
    }

    fn combine(&self, _key: &str, values: Vec<u64>) -> Vec<u64> {
        vec![values.iter().sum()]
    }

    fn reduce(
        &self,
        key: &str,
        values: &mut dyn Iterator<Item = u64>,
        out: &mut dyn FnMut(&str, &str) -> Result<()>,
    ) -> Result<()> {
        // Values are partial sums when the combiner ran, raw units otherwise.
        let sum: u64 = values.sum();
        out(key, &sum.to_string())
    }
}
