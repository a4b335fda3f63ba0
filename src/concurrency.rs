//! Concurrency helper: limit the number of input splits mapped in parallel.

use crate::input::InputSplit;
use anyhow::Result;
use rayon::prelude::*;

/// Run `f` over splits with at most `limit` in flight, collecting outputs in
/// split order. Callers rely on that order when folding into the shuffle.
pub fn map_splits_limited<T, F>(splits: &[InputSplit], limit: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Sync + Fn(&InputSplit) -> Result<T>,
{
    let mut out = Vec::with_capacity(splits.len());
    if limit <= 1 {
        for split in splits {
            out.push(f(split)?);
        }
        return Ok(out);
    }
    for chunk in splits.chunks(limit) {
        let done = chunk.par_iter().map(|split| f(split)).collect::<Result<Vec<T>>>()?;
        out.extend(done);
    }
    Ok(out)
}
