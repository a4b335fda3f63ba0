use crate::util::open_with_backoff;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One input split: a single line-delimited JSON file. The file name doubles
/// as the source partition id inside intermediate keys, so splits with equal
/// names count into the same keys.
#[derive(Clone, Debug)]
pub struct InputSplit {
    pub name: String,
    pub path: PathBuf,
}

/// Expand `input` into splits: a file is one split; a directory contributes
/// every regular file directly inside it, ordered by file name. Hidden and
/// `_`-prefixed entries (staging areas, markers) are skipped.
pub fn discover_splits(input: &Path) -> Result<Vec<InputSplit>> {
    if !input.exists() {
        bail!("input path does not exist: {}", input.display());
    }
    if input.is_file() {
        return Ok(vec![split_for(input.to_path_buf())]);
    }

    let mut splits = Vec::new();
    for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
        let ent = entry.with_context(|| format!("scanning {}", input.display()))?;
        if !ent.file_type().is_file() {
            continue;
        }
        let name = ent.file_name().to_string_lossy();
        if name.starts_with('.') || name.starts_with('_') {
            continue;
        }
        splits.push(split_for(ent.path().to_path_buf()));
    }
    // Name order fixes arrival order downstream.
    splits.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(splits)
}

fn split_for(path: PathBuf) -> InputSplit {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    InputSplit { name, path }
}

/// Stream a line-delimited file; `on_line` sees each line without its
/// terminator (`\r\n` handled). Blank lines are skipped without being counted
/// as records. Lines are read as bytes and decoded lossily, so invalid UTF-8
/// reaches the parser as replacement characters instead of ending the stream.
/// BufReader capacity comes from `read_buf_bytes`.
pub fn for_each_line_cfg(
    path: &Path,
    read_buf_bytes: usize,
    mut on_line: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let file = open_with_backoff(path, 16, 50)
        .with_context(|| format!("open {}", path.display()))?;
    let mut reader = BufReader::with_capacity(read_buf_bytes.max(8 * 1024), file);

    let mut buf: Vec<u8> = Vec::with_capacity(16 * 1024);
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        if buf.ends_with(b"\n") {
            let _ = buf.pop();
            if buf.ends_with(b"\r") { let _ = buf.pop(); }
        }
        if buf.is_empty() {
            continue;
        }
        // Invalid UTF-8 decodes to U+FFFD rather than failing the split.
        let line = String::from_utf8_lossy(&buf);
        on_line(&line)?;
    }
    Ok(())
}
