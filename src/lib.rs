mod config;
mod error;
mod record;
mod input;

mod mapred;
mod grouping;
mod concurrency;
mod output;
mod runner;

mod progress;
mod util;
mod driver;

mod subreddit_count;
mod comment_hierarchy;

pub use crate::config::{JobOptions, MIN_REDUCE_TASKS};
pub use crate::error::{MalformedRecordError, MissingFieldError};
pub use crate::record::{parse_record, Record};
pub use crate::input::{discover_splits, for_each_line_cfg, InputSplit};

pub use crate::mapred::MapReduce;
pub use crate::grouping::{KeyPartitioner, ReducePartition, Shuffle};
pub use crate::runner::{JobRunner, JobSummary};

// The two production jobs.
pub use crate::subreddit_count::SubredditCount;
pub use crate::comment_hierarchy::{CommentEdge, CommentHierarchy};

// Expose the binaries' entry contract so tests can drive it end to end.
pub use crate::driver::run_cli;

// Expose partitioned output writers (reduce side).
pub use crate::output::PartWriters;

// Expose progress helper and robust file ops so binaries can import from crate root.
pub use crate::progress::make_count_progress;
pub use crate::util::{init_tracing_once, open_with_backoff, create_with_backoff, remove_with_backoff, replace_file_atomic_backoff, remove_output_path};
