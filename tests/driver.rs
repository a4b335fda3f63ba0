#[path = "common/mod.rs"]
mod common;

use common::*;
use redmap::{run_cli, CommentHierarchy, SubredditCount, MIN_REDUCE_TASKS};
use std::fs;

/// Anything but exactly two positional arguments is a usage error (exit 1).
#[test]
fn usage_requires_two_args() {
    let job = SubredditCount::new();
    assert_eq!(run_cli("subreddit_count", &job, &[]), 1);
    assert_eq!(run_cli("subreddit_count", &job, &["only_input".to_string()]), 1);
    let three = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    assert_eq!(run_cli("subreddit_count", &job, &three), 1);
}

/// A pre-existing output directory is cleared before the run: stale files
/// disappear, the job exits 0, and exactly the default part files appear.
#[test]
fn clears_preexisting_output_dir() {
    let base = make_corpus(&[("fileA", vec![comment_line("r1", "p1", "c1", "100")])]);
    let out = base.join("out");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("stale.txt"), "junk").unwrap();
    fs::write(out.join("part-r-99999"), "junk").unwrap();

    let args = vec![
        base.join("input").display().to_string(),
        out.display().to_string(),
    ];
    let code = run_cli("subreddit_count", &SubredditCount::new(), &args);
    assert_eq!(code, 0);

    assert!(!out.join("stale.txt").exists());
    assert!(!out.join("part-r-99999").exists());
    assert_eq!(part_files(&out).len(), MIN_REDUCE_TASKS);
    assert_eq!(read_part_records(&out), vec!["fileA r1\t1".to_string()]);
}

/// A plain file squatting on the output path is removed too.
#[test]
fn clears_file_at_output_path() {
    let base = make_corpus(&[("fileA", vec![comment_line("r1", "p1", "c1", "100")])]);
    let out = base.join("out");
    fs::write(&out, "junk").unwrap();

    let args = vec![
        base.join("input").display().to_string(),
        out.display().to_string(),
    ];
    let code = run_cli("subreddit_count", &SubredditCount::new(), &args);
    assert_eq!(code, 0);
    assert!(out.is_dir());
    assert_eq!(part_files(&out).len(), MIN_REDUCE_TASKS);
}

/// Reruns over identical input produce byte-identical output: stable key
/// routing, sorted keys per partition, arrival-ordered values.
#[test]
fn reruns_are_byte_identical() {
    let base = make_corpus(&[
        (
            "fileA",
            vec![
                comment_line("r1", "p1", "c1", "100"),
                comment_line("r2", "p2", "c2", "101"),
                comment_line("r1", "p3", "c3", "102"),
            ],
        ),
        ("fileB", vec![comment_line("r3", "p4", "c4", "103")]),
    ]);
    let out = base.join("out");
    let args = vec![
        base.join("input").display().to_string(),
        out.display().to_string(),
    ];

    assert_eq!(run_cli("comment_hierarchy", &CommentHierarchy::new(), &args), 0);
    let first = concat_part_bytes(&out);
    assert!(!first.is_empty());

    assert_eq!(run_cli("comment_hierarchy", &CommentHierarchy::new(), &args), 0);
    let second = concat_part_bytes(&out);
    assert_eq!(first, second);
}

/// A missing input path fails the run with exit 1.
#[test]
fn missing_input_exits_nonzero() {
    let base = tempfile::tempdir().unwrap().into_path();
    let args = vec![
        base.join("nope").display().to_string(),
        base.join("out").display().to_string(),
    ];
    assert_eq!(run_cli("subreddit_count", &SubredditCount::new(), &args), 1);
}
