//! Shared entry contract for the job binaries: two positional arguments, the
//! output path cleared up front, exit code 0/1.

use crate::mapred::MapReduce;
use crate::runner::JobRunner;
use crate::util::{init_tracing_once, remove_output_path};
use std::path::PathBuf;

/// Run `job` the way the binaries do. Takes the arguments after the program
/// name and returns the process exit code instead of exiting, so tests can
/// drive the whole contract.
pub fn run_cli<J: MapReduce>(tool: &str, job: &J, args: &[String]) -> u8 {
    init_tracing_once();

    let (input, output) = match args {
        [input, output] => (PathBuf::from(input), PathBuf::from(output)),
        _ => {
            eprintln!("Usage: {} <input> <output>", tool);
            return 1;
        }
    };

    // Reruns overwrite: whatever occupies the output path goes first.
    if let Err(e) = remove_output_path(&output) {
        eprintln!("{}: cannot clear output path: {:#}", tool, e);
        return 1;
    }

    let mut runner = JobRunner::new();
    if let Some(n) = reduce_tasks_from_env() {
        runner = runner.reduce_tasks(n);
    }

    tracing::info!("Running {}: {} -> {}", tool, input.display(), output.display());
    match runner.run(job, &input, &output) {
        Ok(summary) => {
            tracing::info!(
                "{} wrote {} record(s) across {} part file(s).",
                tool,
                summary.output_records,
                summary.part_files.len()
            );
            0
        }
        Err(e) => {
            eprintln!("{}: {:#}", tool, e);
            1
        }
    }
}

/// Optional reduce-task override for the binaries. Values below the floor are
/// bumped up by the options layer, like any other caller's.
fn reduce_tasks_from_env() -> Option<usize> {
    let raw = std::env::var("REDMAP_REDUCE_TASKS").ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!("REDMAP_REDUCE_TASKS is set but not a positive integer: {}", raw);
            None
        }
    }
}
