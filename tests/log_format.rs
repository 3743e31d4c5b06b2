#![allow(missing_docs)]

use std::fs;

use arraybench::bench::TestKind;
use arraybench::results::{append_row, ensure_log, ResultRow, SCHEMA};
use tempfile::tempdir;

fn sample_row(dataset: &str) -> ResultRow {
    ResultRow {
        timestamp: "2024-01-01T00:00:00Z".into(),
        test: TestKind::Read,
        impl_label: "refX".into(),
        file: "data.arr".into(),
        dataset: dataset.into(),
        seconds: 0.123456,
        mb_s: 81.02,
        value: None,
    }
}

#[test]
fn fresh_log_starts_with_exact_header() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    ensure_log(&path).expect("ensure log");

    let contents = fs::read_to_string(&path).expect("read log");
    let first_line = contents.lines().next().expect("header line");
    assert_eq!(first_line, "timestamp,test,impl,file,dataset,seconds,mb_s,value");
    assert_eq!(first_line, SCHEMA.join(","));
}

#[test]
fn ensure_log_is_idempotent_on_populated_log() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    ensure_log(&path).expect("ensure log");
    append_row(&path, &sample_row("ds1")).expect("append");
    append_row(&path, &sample_row("ds2")).expect("append");

    let before = fs::read(&path).expect("read log");
    ensure_log(&path).expect("ensure log again");
    let after = fs::read(&path).expect("read log");
    assert_eq!(before, after);
}

#[test]
fn log_grows_append_only_across_invocations() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");

    let mut seen_prefix = String::new();
    for n in 1..=3 {
        // Each "invocation" re-runs the header check first.
        ensure_log(&path).expect("ensure log");
        append_row(&path, &sample_row(&format!("ds{n}"))).expect("append");

        let contents = fs::read_to_string(&path).expect("read log");
        assert_eq!(contents.lines().count(), n + 1, "header plus {n} rows");
        assert!(
            contents.starts_with(&seen_prefix),
            "existing rows must never be rewritten"
        );
        seen_prefix = contents;
    }
}

#[test]
fn ensure_log_creates_missing_parent_directories() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested/results/benchmarks.csv");
    ensure_log(&path).expect("ensure log");
    assert!(path.exists());
}

#[test]
fn zero_length_log_gets_a_header() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    fs::write(&path, b"").expect("touch empty file");
    ensure_log(&path).expect("ensure log");
    let contents = fs::read_to_string(&path).expect("read log");
    assert_eq!(contents.lines().count(), 1);
}
