#![allow(missing_docs)]

use std::fs;

use arraybench::error::BenchError;
use arraybench::report::{load_rows, summarize, write_summary_csv, Metric};
use tempfile::tempdir;

#[test]
fn load_coerces_junk_numerics_and_trims_labels() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    fs::write(
        &path,
        "timestamp,test,impl,file,dataset,seconds,mb_s,value\n\
         2024-01-01T00:00:00Z, read ,refX,data.arr, ds1 ,0.5,128.00,\n\
         2024-01-01T00:00:00Z,read,refX,data.arr,ds1,oops,not-a-number,\n\
         2024-01-01T00:00:00Z,compute-avg,refY,data.arr,ds1,1.0,64.00,4\n",
    )
    .expect("write log");

    let rows = load_rows(&path).expect("load rows");
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].test, "read");
    assert_eq!(rows[0].dataset, "ds1");
    assert_eq!(rows[0].mb_s, Some(128.0));

    assert_eq!(rows[1].seconds, None);
    assert_eq!(rows[1].mb_s, None);

    assert_eq!(rows[2].value, Some(4.0));
}

#[test]
fn rows_missing_the_metric_are_dropped_from_its_summary() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    fs::write(
        &path,
        "timestamp,test,impl,file,dataset,seconds,mb_s,value\n\
         2024-01-01T00:00:00Z,read,refX,data.arr,ds1,0.5,100.00,\n\
         2024-01-01T00:00:00Z,read,refX,data.arr,ds1,0.5,300.00,\n\
         2024-01-01T00:00:00Z,read,refX,data.arr,ds1,0.5,junk,\n",
    )
    .expect("write log");

    let rows = load_rows(&path).expect("load rows");

    let throughput = summarize(&rows, Metric::MbS);
    assert_eq!(throughput.len(), 1);
    assert_eq!(throughput[0].samples, 2);
    assert_eq!(throughput[0].mean, 200.0);

    // The junk throughput row still carries a valid duration.
    let latency = summarize(&rows, Metric::Seconds);
    assert_eq!(latency[0].samples, 3);
}

#[test]
fn missing_log_is_an_input_error() {
    let dir = tempdir().expect("tempdir");
    let err = load_rows(&dir.path().join("absent.csv")).expect_err("must fail");
    assert!(matches!(err, BenchError::InvalidArgument(_)));
}

#[test]
fn summary_csv_round_trips_group_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("benchmarks.csv");
    fs::write(
        &path,
        "timestamp,test,impl,file,dataset,seconds,mb_s,value\n\
         2024-01-01T00:00:00Z,read,refY,data.arr,ds1,0.5,100.00,\n\
         2024-01-01T00:00:00Z,read,refX,data.arr,ds1,0.5,200.00,\n",
    )
    .expect("write log");

    let rows = load_rows(&path).expect("load rows");
    let summaries = summarize(&rows, Metric::MbS);
    let out_dir = dir.path().join("summaries");
    write_summary_csv(&out_dir, Metric::MbS, &summaries).expect("write summary");

    let contents =
        fs::read_to_string(out_dir.join("summary_mb_s.csv")).expect("read summary");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "test,dataset,impl,mb_s,samples");
    assert_eq!(lines[1], "read,ds1,refX,200.000000,1");
    assert_eq!(lines[2], "read,ds1,refY,100.000000,1");
}
