use serde_json::json;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Write a plain JSONL file containing the provided lines.
pub fn write_jsonl(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

/// Every `part-r-*` file under `out_dir`, in partition order.
pub fn part_files(out_dir: &Path) -> Vec<PathBuf> {
    let mut parts: Vec<PathBuf> = fs::read_dir(out_dir)
        .unwrap()
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("part-r-"))
                .unwrap_or(false)
        })
        .collect();
    parts.sort();
    parts
}

/// All output records across part files, in (partition, line) order.
pub fn read_part_records(out_dir: &Path) -> Vec<String> {
    part_files(out_dir).iter().flat_map(|p| read_lines(p)).collect()
}

/// Concatenated bytes of every part file in partition order. For
/// byte-identity checks across runs and configurations.
pub fn concat_part_bytes(out_dir: &Path) -> Vec<u8> {
    let mut all = Vec::new();
    for p in part_files(out_dir) {
        all.extend(fs::read(&p).unwrap());
    }
    all
}

/// One comment record in the shape the jobs consume, surrounded by the usual
/// extra corpus fields so tests exercise real-looking lines.
pub fn comment_line(subreddit: &str, parent: &str, name: &str, ts: &str) -> String {
    json!({
        "body": "some text", "subreddit_id": "t5_x", "link_id": "t3_s1",
        "stickied": false, "subreddit": subreddit, "score": 1, "ups": 1,
        "author": "alice", "id": name, "edited": false, "parent_id": parent,
        "name": name, "gilded": 0, "created_utc": ts, "retrieved_on": 1136075600
    })
    .to_string()
}

/// Lay out `(file name, lines)` pairs under `<base>/input` in a fresh temp
/// dir; returns `base`. Job outputs usually go to `<base>/out`.
pub fn make_corpus(files: &[(&str, Vec<String>)]) -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();
    for (name, lines) in files {
        write_jsonl(&base.join("input").join(name), lines);
    }
    base
}
