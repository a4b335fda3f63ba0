use redmap::{run_cli, CommentHierarchy};
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    ExitCode::from(run_cli("comment_hierarchy", &CommentHierarchy::new(), &args))
}
