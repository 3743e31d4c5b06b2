//! Benchmark harness CLI: times dataset reads from an array-store file
//! and appends one CSV row per measurement.
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process;

use arraybench::bench::{run, FailurePolicy, RunOptions, TestKind};
use arraybench::error::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "arraybench",
    version,
    about = "Times dataset reads from an array-store file and records them to a CSV log"
)]
struct Args {
    /// What the timed region covers.
    #[arg(long, value_enum, default_value_t = TestKind::Read)]
    test: TestKind,

    /// Path to the array-store file to measure.
    #[arg(long)]
    file: PathBuf,

    /// Path to the result log.
    #[arg(long)]
    csv: PathBuf,

    /// Dataset name to measure; repeat for multiple datasets.
    #[arg(long = "dataset", value_name = "NAME", required = true)]
    datasets: Vec<String>,

    /// Implementation label written to each row.
    #[arg(long = "impl", default_value = "arraybench")]
    impl_label: String,

    /// Explicit ISO-8601 timestamp; generated when omitted.
    #[arg(long, default_value = "")]
    timestamp: String,

    /// Keep measuring remaining datasets when one fails, reporting all
    /// failures at the end instead of aborting on the first.
    #[arg(long)]
    keep_going: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    if let Err(err) = try_main() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let opts = RunOptions {
        file: args.file,
        csv: args.csv,
        datasets: args.datasets,
        test: args.test,
        impl_label: args.impl_label,
        timestamp: args.timestamp,
        policy: if args.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::AbortFirst
        },
    };
    let summary = run(&opts)?;
    if !summary.is_success() {
        for (dataset, err) in &summary.failures {
            eprintln!("Error: {dataset}: {err}");
        }
        process::exit(1);
    }
    Ok(())
}
