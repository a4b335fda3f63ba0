use crate::concurrency::map_splits_limited;
use crate::config::JobOptions;
use crate::grouping::Shuffle;
use crate::input::{discover_splits, for_each_line_cfg, InputSplit};
use crate::mapred::MapReduce;
use crate::output::PartWriters;
use crate::progress::make_count_progress;
use crate::record::parse_record;
use crate::util::init_tracing_once;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Counters and outputs of one finished run.
#[derive(Clone, Debug, Default)]
pub struct JobSummary {
    /// Non-blank input lines seen.
    pub records_in: u64,
    /// Lines skipped because they did not parse as a JSON object.
    pub malformed_records: u64,
    /// Records skipped because a required field was absent.
    pub missing_field_records: u64,
    /// (key, value) pairs emitted by the map stage, before any combine.
    pub values_emitted: u64,
    /// Lines written across all part files.
    pub output_records: u64,
    /// Final part files, in partition order.
    pub part_files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default)]
struct SplitStats {
    records_in: u64,
    malformed: u64,
    missing_field: u64,
    emitted: u64,
}

struct MapOutput<V> {
    pairs: Vec<(String, V)>,
    stats: SplitStats,
}

/// Executes a [`MapReduce`] job over an input path: parallel per-split map,
/// split-ordered in-memory shuffle, parallel per-partition reduce into
/// `part-r-NNNNN` files under the output directory.
#[derive(Clone)]
pub struct JobRunner {
    opts: JobOptions,
}

impl JobRunner {
    pub fn new() -> Self {
        Self { opts: JobOptions::default() }
    }

    // -------- Builder methods --------
    pub fn reduce_tasks(mut self, n: usize) -> Self { self.opts = self.opts.with_reduce_tasks(n); self }
    pub fn map_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_map_concurrency(n); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }

    /// Run `job` over `input` (one JSONL file or a directory of them),
    /// writing part files under the `output` directory.
    pub fn run<J: MapReduce>(&self, job: &J, input: &Path, output: &Path) -> Result<JobSummary> {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism { if n > 0 { rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); } }

        let splits = discover_splits(input)?;
        if splits.is_empty() {
            tracing::warn!("No input files found under {}.", input.display());
        } else {
            tracing::info!("Planned {} input split(s) for processing.", splits.len());
        }

        // ---- Map phase: per split, bounded concurrency ----
        let read_buf = self.opts.read_buffer_bytes;
        let pb = if self.opts.progress {
            Some(make_count_progress(splits.len() as u64, "map"))
        } else {
            None
        };

        let map_outputs = map_splits_limited(&splits, self.opts.map_concurrency, |split| {
            let out = map_one_split(job, split, read_buf)
                .with_context(|| format!("mapping {}", split.path.display()))?;
            if let Some(pb) = &pb { pb.inc(1); }
            Ok(out)
        })?;
        if let Some(pb) = &pb { pb.finish_with_message("map done"); }

        // ---- Shuffle: the phase barrier. Folding outputs in split order
        // fixes arrival order regardless of map scheduling. ----
        let mut summary = JobSummary::default();
        let mut shuffle: Shuffle<J::Value> = Shuffle::new(self.opts.reduce_tasks);
        for out in map_outputs {
            summary.records_in += out.stats.records_in;
            summary.malformed_records += out.stats.malformed;
            summary.missing_field_records += out.stats.missing_field;
            summary.values_emitted += out.stats.emitted;
            shuffle.extend(out.pairs);
        }

        // ---- Reduce phase: one task per partition, keys in sorted order ----
        let writers = PartWriters::create(output, self.opts.reduce_tasks, self.opts.write_buffer_bytes)?;
        let partitions = shuffle.into_partitions();
        let pb = if self.opts.progress {
            Some(make_count_progress(partitions.len() as u64, "reduce"))
        } else {
            None
        };

        let written = partitions
            .into_par_iter()
            .map(|part| {
                let mut written = 0u64;
                let idx = part.index;
                for (key, values) in part.groups {
                    let mut vals = values.into_iter();
                    let mut out = |k: &str, v: &str| -> Result<()> {
                        writers.write_record(idx, k, v)?;
                        written += 1;
                        Ok(())
                    };
                    job.reduce(&key, &mut vals, &mut out)
                        .with_context(|| format!("reducing key `{}`", key))?;
                }
                if let Some(pb) = &pb { pb.inc(1); }
                Ok(written)
            })
            .collect::<Result<Vec<u64>>>()?;
        if let Some(pb) = &pb { pb.finish_with_message("reduce done"); }

        summary.output_records = written.iter().sum();
        summary.part_files = writers.finalize()?;

        tracing::info!(
            "Job complete: {} record(s) in, {} malformed, {} missing-field, {} emitted, {} written.",
            summary.records_in,
            summary.malformed_records,
            summary.missing_field_records,
            summary.values_emitted,
            summary.output_records
        );
        Ok(summary)
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Map one split: parse each line, apply the job's map, keep per-split skip
/// counters. Emissions stay in line order; a record that fails mid-map is
/// dropped whole.
fn map_one_split<J: MapReduce>(job: &J, split: &InputSplit, read_buf: usize) -> Result<MapOutput<J::Value>> {
    let mut stats = SplitStats::default();
    let mut pairs: Vec<(String, J::Value)> = Vec::new();

    for_each_line_cfg(&split.path, read_buf, |line| {
        stats.records_in += 1;
        let record = match parse_record(line) {
            Ok(r) => r,
            Err(e) => {
                stats.malformed += 1;
                tracing::debug!("skipping record in {}: {}", split.name, e);
                return Ok(());
            }
        };
        let before = pairs.len();
        match job.map(&record, split, &mut |k, v| pairs.push((k, v))) {
            Ok(()) => stats.emitted += (pairs.len() - before) as u64,
            Err(e) => {
                pairs.truncate(before);
                stats.missing_field += 1;
                tracing::debug!("skipping record in {}: {}", split.name, e);
            }
        }
        Ok(())
    })?;

    if stats.malformed > 0 || stats.missing_field > 0 {
        tracing::warn!(
            "Skipped {} malformed and {} missing-field record(s) in {}.",
            stats.malformed,
            stats.missing_field,
            split.name
        );
    }

    if job.has_combiner() {
        pairs = combine_split_pairs(job, pairs);
    }
    Ok(MapOutput { pairs, stats })
}

/// Group one split's pairs by key (first-arrival key order) and pre-fold each
/// group with the job's combiner.
fn combine_split_pairs<J: MapReduce>(job: &J, pairs: Vec<(String, J::Value)>) -> Vec<(String, J::Value)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<J::Value>> = HashMap::new();
    for (key, value) in pairs {
        match groups.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().push(value),
            Entry::Vacant(e) => {
                order.push(e.key().clone());
                e.insert(vec![value]);
            }
        }
    }

    let mut out = Vec::with_capacity(order.len());
    for key in order {
        let values = groups.remove(&key).unwrap_or_default();
        for value in job.combine(&key, values) {
            out.push((key.clone(), value));
        }
    }
    out
}
