//! Report CLI: aggregates the result log into per-metric summaries.
#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::process;

use arraybench::error::Result;
use arraybench::report::{load_rows, print_table, summarize, write_summary_csv, Metric};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "arraybench-report",
    version,
    about = "Summarizes an arraybench result log per metric"
)]
struct Args {
    /// Path to the result log to summarize.
    #[arg(long, default_value = "results/benchmarks.csv")]
    csv: PathBuf,

    /// Directory the per-metric summary CSV files are written into.
    #[arg(long, default_value = "results")]
    out_dir: PathBuf,
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
    let rows = load_rows(&args.csv)?;
    for metric in Metric::ALL {
        let summaries = summarize(&rows, metric);
        if summaries.is_empty() {
            continue;
        }
        print_table(metric, &summaries);
        write_summary_csv(&args.out_dir, metric, &summaries)?;
    }
    Ok(())
}
