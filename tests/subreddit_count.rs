#[path = "common/mod.rs"]
mod common;

use common::*;
use redmap::{JobRunner, SubredditCount};
use serde_json::json;
use std::fs;

/// Two fileA records in r1 fold to the exact line `fileA r1<TAB>2`; the other
/// (file, subreddit) pairs keep their own counts. Also checks conservation:
/// the counts sum to the number of records carrying a subreddit.
#[test]
fn counts_per_file_and_subreddit() {
    let base = make_corpus(&[
        (
            "fileA",
            vec![
                comment_line("r1", "p1", "c1", "100"),
                comment_line("r1", "p2", "c2", "101"),
                comment_line("r2", "p3", "c3", "102"),
            ],
        ),
        ("fileB", vec![comment_line("r1", "p4", "c4", "103")]),
    ]);
    let out = base.join("out");

    let summary = JobRunner::new()
        .progress(false)
        .run(&SubredditCount::new(), &base.join("input"), &out)
        .unwrap();

    let mut records = read_part_records(&out);
    records.sort();
    assert_eq!(
        records,
        vec![
            "fileA r1\t2".to_string(),
            "fileA r2\t1".to_string(),
            "fileB r1\t1".to_string(),
        ]
    );

    assert_eq!(summary.records_in, 4);
    assert_eq!(summary.values_emitted, 4);
    let total: u64 = records
        .iter()
        .filter_map(|l| l.split_once('\t').and_then(|(_, v)| v.parse::<u64>().ok()))
        .sum();
    assert_eq!(total, summary.records_in - summary.malformed_records - summary.missing_field_records);
}

/// A record without `subreddit` is skipped and counted; the run still
/// succeeds and the remaining records come out complete.
#[test]
fn skips_records_missing_subreddit() {
    let no_sub = json!({
        "body": "orphan", "author": "bob", "parent_id": "p1",
        "name": "c9", "created_utc": "100"
    })
    .to_string();
    let base = make_corpus(&[(
        "fileA",
        vec![comment_line("r1", "p1", "c1", "100"), no_sub],
    )]);
    let out = base.join("out");

    let summary = JobRunner::new()
        .progress(false)
        .run(&SubredditCount::new(), &base.join("input"), &out)
        .unwrap();

    assert_eq!(summary.records_in, 2);
    assert_eq!(summary.missing_field_records, 1);
    assert_eq!(read_part_records(&out), vec!["fileA r1\t1".to_string()]);
}

/// Unparsable lines are counted and skipped; blank lines are ignored
/// entirely. Neither fails the run.
#[test]
fn skips_malformed_lines() {
    let base = make_corpus(&[(
        "fileA",
        vec![
            comment_line("r1", "p1", "c1", "100"),
            "{not json".to_string(),
            String::new(),
            "[1,2,3]".to_string(),
        ],
    )]);
    let out = base.join("out");

    let summary = JobRunner::new()
        .progress(false)
        .run(&SubredditCount::new(), &base.join("input"), &out)
        .unwrap();

    assert_eq!(summary.records_in, 3); // the blank line is not a record
    assert_eq!(summary.malformed_records, 2);
    assert_eq!(summary.output_records, 1);
    assert_eq!(read_part_records(&out), vec!["fileA r1\t1".to_string()]);
}

/// A line whose bytes are not valid UTF-8 is skipped and counted like any
/// other unparsable line; the records around it still count and the run
/// succeeds.
#[test]
fn skips_lines_with_invalid_utf8() {
    let base = make_corpus(&[(
        "fileA",
        vec![
            comment_line("r1", "p1", "c1", "100"),
            comment_line("r1", "p2", "c2", "101"),
        ],
    )]);
    let file = base.join("input").join("fileA");
    let mut bytes = fs::read(&file).unwrap();
    bytes.extend_from_slice(b"\xFF\xFE{\"subreddit\":\"r9\"}\n");
    bytes.extend_from_slice(comment_line("r2", "p3", "c3", "102").as_bytes());
    bytes.extend_from_slice(b"\n");
    fs::write(&file, bytes).unwrap();

    let out = base.join("out");
    let summary = JobRunner::new()
        .progress(false)
        .run(&SubredditCount::new(), &base.join("input"), &out)
        .unwrap();

    assert_eq!(summary.records_in, 4);
    assert_eq!(summary.malformed_records, 1);

    let mut records = read_part_records(&out);
    records.sort();
    assert_eq!(
        records,
        vec!["fileA r1\t2".to_string(), "fileA r2\t1".to_string()]
    );
}

/// Changing the partition count moves keys between part files but never
/// changes per-key results.
#[test]
fn partition_count_does_not_change_results() {
    let base = make_corpus(&[
        (
            "fileA",
            vec![
                comment_line("r1", "p1", "c1", "100"),
                comment_line("r2", "p2", "c2", "101"),
                comment_line("r3", "p3", "c3", "102"),
                comment_line("r1", "p4", "c4", "103"),
            ],
        ),
        (
            "fileB",
            vec![
                comment_line("r2", "p5", "c5", "104"),
                comment_line("r3", "p6", "c6", "105"),
            ],
        ),
    ]);
    let out4 = base.join("out4");
    let out7 = base.join("out7");

    JobRunner::new()
        .progress(false)
        .reduce_tasks(4)
        .run(&SubredditCount::new(), &base.join("input"), &out4)
        .unwrap();
    JobRunner::new()
        .progress(false)
        .reduce_tasks(7)
        .run(&SubredditCount::new(), &base.join("input"), &out7)
        .unwrap();

    assert_eq!(part_files(&out4).len(), 4);
    assert_eq!(part_files(&out7).len(), 7);

    let mut a = read_part_records(&out4);
    let mut b = read_part_records(&out7);
    a.sort();
    b.sort();
    assert_eq!(a, b);
}
