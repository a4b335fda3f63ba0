//! Typed per-record errors. Substrate failures (I/O, threading) stay opaque
//! `anyhow::Error`s; only errors with a skip-and-count policy get a type.

use thiserror::Error;

const SNIPPET_MAX: usize = 160;

/// An input line that could not be parsed as a JSON object.
/// The record is lost: skipped, counted, and logged, never retried.
#[derive(Debug, Error)]
#[error("malformed record ({}): {}", .source, snippet(.line))]
pub struct MalformedRecordError {
    /// The offending line, verbatim.
    pub line: String,
    #[source]
    pub source: serde_json::Error,
}

/// A required field was absent (or JSON `null`) in an otherwise well-formed
/// record. Map stages return this to skip the record without failing the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record has no `{field}` field")]
pub struct MissingFieldError {
    pub field: &'static str,
}

/// Corpus lines can run to megabytes; keep log lines bounded.
fn snippet(line: &str) -> String {
    if line.len() <= SNIPPET_MAX {
        return line.to_string();
    }
    let mut end = SNIPPET_MAX;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &line[..end])
}
