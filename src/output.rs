use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::util::{create_with_backoff, replace_file_atomic_backoff};

/// One buffered writer per reduce partition, producing `key<TAB>value` text
/// records. Every partition gets a part file, bundles or not, so the part
/// count always equals the partition count.
///
/// File layout:
///   <dir>/_staging/part-r-NNNNN.inprogress  (temp)
///   <dir>/part-r-NNNNN                      (final, after finalize())
///
/// `write_record()` is concurrency-friendly (internal per-part mutex).
pub struct PartWriters {
    writers: Vec<Mutex<BufWriter<File>>>,
    tmp_paths: Vec<PathBuf>,
    final_paths: Vec<PathBuf>,
    staging: PathBuf,
}

impl PartWriters {
    /// Create `parts` writers under `dir`. Writes go into a staging directory
    /// and are atomically promoted on `finalize()`.
    pub fn create(dir: &Path, parts: usize, write_buf: usize) -> Result<Self> {
        let parts = parts.max(1);
        let staging = dir.join("_staging");
        fs::create_dir_all(&staging)?;
        fs::create_dir_all(dir)?;

        let mut writers = Vec::with_capacity(parts);
        let mut tmp_paths = Vec::with_capacity(parts);
        let mut final_paths = Vec::with_capacity(parts);

        for i in 0..parts {
            let tmp = staging.join(format!("part-r-{:05}.inprogress", i));
            let final_p = dir.join(format!("part-r-{:05}", i));
            let f = create_with_backoff(&tmp, 16, 50)
                .with_context(|| format!("create {}", tmp.display()))?;
            writers.push(Mutex::new(BufWriter::with_capacity(write_buf, f)));
            tmp_paths.push(tmp);
            final_paths.push(final_p);
        }

        Ok(Self { writers, tmp_paths, final_paths, staging })
    }

    pub fn parts(&self) -> usize {
        self.writers.len()
    }

    /// Append one `key<TAB>value` line to the given partition's file.
    pub fn write_record(&self, part: usize, key: &str, value: &str) -> Result<()> {
        let mut w = self.writers[part].lock();
        w.write_all(key.as_bytes())?;
        w.write_all(b"\t")?;
        w.write_all(value.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(())
    }

    fn flush_all(&self) -> Result<()> {
        for w in &self.writers {
            w.lock().flush()?;
        }
        Ok(())
    }

    /// Flush, close, and promote all `.inprogress` files to final part files
    /// atomically. Returns the final paths in partition order.
    pub fn finalize(mut self) -> Result<Vec<PathBuf>> {
        self.flush_all()?;
        // Ensure files are closed before rename/copy
        let writers = std::mem::take(&mut self.writers);
        drop(writers);

        let tmp_paths = self.tmp_paths;
        let final_paths = self.final_paths;

        for (tmp, final_p) in tmp_paths.iter().zip(final_paths.iter()) {
            replace_file_atomic_backoff(tmp, final_p)?;
        }
        // Staging should be empty now; removal is best-effort.
        let _ = fs::remove_dir(&self.staging);

        Ok(final_paths)
    }
}
