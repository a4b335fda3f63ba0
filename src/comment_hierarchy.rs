//! Hierarchy job: group comments by subreddit and index children under the
//! comment they reply to.

use crate::error::MissingFieldError;
use crate::input::InputSplit;
use crate::mapred::MapReduce;
use crate::record::Record;
use anyhow::Result;
use std::collections::BTreeMap;

/// One comment's threading edge: which parent it answers and when.
/// Timestamps stay textual; they are payload here, never arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentEdge {
    pub parent_id: String,
    pub name: String,
    pub created_utc: String,
}

/// Groups comments by subreddit and emits `parent -> {child: timestamp}`
/// index fragments as JSON.
///
/// The default writes one single-entry fragment per comment, in arrival
/// order, so a subreddit with N comments yields N output lines.
/// [`CommentHierarchy::merged`] instead folds all of a subreddit's comments
/// into one index and writes it once, children sorted under each parent.
#[derive(Clone, Debug)]
pub struct CommentHierarchy {
    merge_per_key: bool,
}

impl CommentHierarchy {
    pub fn new() -> Self {
        Self { merge_per_key: false }
    }

    /// One merged index per subreddit instead of one fragment per comment.
    pub fn merged() -> Self {
        Self { merge_per_key: true }
    }
}

impl Default for CommentHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl MapReduce for CommentHierarchy {
    type Value = CommentEdge;

    fn map(
        &self,
        record: &Record,
        _split: &InputSplit,
        emit: &mut dyn FnMut(String, CommentEdge),
    ) -> Result<(), MissingFieldError> {
        let subreddit = record.subreddit()?;
        let edge = CommentEdge {
            parent_id: record.parent_id()?.to_string(),
            name: record.name()?.to_string(),
            created_utc: record.created_utc()?.to_string(),
        };
        emit(subreddit.to_string(), edge);
        Ok(())
    }

    fn reduce(
        &self,
        key: &str,
        values: &mut dyn Iterator<Item = CommentEdge>,
        out: &mut dyn FnMut(&str, &str) -> Result<()>,
    ) -> Result<()> {
        if self.merge_per_key {
            let mut index: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
            for edge in values {
                index.entry(edge.parent_id).or_default().insert(edge.name, edge.created_utc);
            }
            let json = serde_json::to_string(&index)?;
            out(key, &json)
        } else {
            for edge in values {
                // A fresh single-entry index per comment: {"parent":{"child":"ts"}}
                let mut children = BTreeMap::new();
                children.insert(edge.name, edge.created_utc);
                let mut fragment = BTreeMap::new();
                fragment.insert(edge.parent_id, children);
                let json = serde_json::to_string(&fragment)?;
                out(key, &json)?;
            }
            Ok(())
        }
    }
}
