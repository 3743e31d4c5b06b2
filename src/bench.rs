//! Dataset benchmark runner and run driver.
//!
//! One invocation performs one pass over a fixed list of named datasets in
//! one store file, appending one result row per successful measurement.
//! Datasets are measured strictly one at a time so elapsed wall-clock time
//! is not skewed by contention.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::ValueEnum;
use tracing::{debug, info, warn};

use crate::error::{BenchError, Result};
use crate::results::{self, ResultRow};
use crate::store::ArrayStore;

/// What the timed region covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab_case")]
pub enum TestKind {
    /// Pure read: materialize the dataset into memory.
    Read,
    /// Read plus an in-memory arithmetic mean over all elements. The
    /// reduction is timed together with the read, representing compute
    /// cost on top of I/O.
    ComputeAvg,
}

impl TestKind {
    /// Label written to the `test` column of the result log.
    pub fn label(self) -> &'static str {
        match self {
            TestKind::Read => "read",
            TestKind::ComputeAvg => "compute-avg",
        }
    }
}

/// What happens to the rest of the run when one dataset fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// First failure terminates the run; earlier rows stay appended,
    /// remaining datasets are not attempted.
    AbortFirst,
    /// Remaining datasets are still attempted; failures are collected and
    /// reported together at the end.
    KeepGoing,
}

/// One timed measurement with its derived values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Wall-clock duration of the timed region (monotonic clock).
    pub seconds: f64,
    /// Throughput in MiB/s, 0.0 for a degenerate interval.
    pub mb_s: f64,
    /// Mean over all elements for `compute-avg`, absent for pure reads.
    pub value: Option<f64>,
}

impl Measurement {
    /// Derive a measurement from a raw timed interval.
    pub fn from_interval(total_bytes: u64, seconds: f64, value: Option<f64>) -> Self {
        Self {
            seconds,
            mb_s: throughput_mib_s(total_bytes, seconds),
            value,
        }
    }
}

/// `total_bytes / seconds` in MiB/s; 0.0 when the interval is zero or
/// negative rather than a division artifact.
pub fn throughput_mib_s(total_bytes: u64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        total_bytes as f64 / seconds / (1024.0 * 1024.0)
    } else {
        0.0
    }
}

/// Time a single dataset read (plus reduction for `compute-avg`).
///
/// The store is opened read-only and closed on all exit paths. The byte
/// size comes from directory metadata and is derived before the timer
/// starts; only the read (and the mean, for `compute-avg`) is timed.
pub fn measure(store_path: &Path, dataset_name: &str, test: TestKind) -> Result<Measurement> {
    let mut store = ArrayStore::open(store_path)?;
    let info = store.dataset(dataset_name)?.clone();
    let total_bytes = info.total_bytes();
    debug!(
        dataset = dataset_name,
        total_bytes,
        test = test.label(),
        "starting timed region"
    );

    let start = Instant::now();
    let bytes = store.read(&info)?;
    let value = match test {
        TestKind::Read => None,
        TestKind::ComputeAvg => Some(info.dtype.mean_le(&bytes)),
    };
    let seconds = start.elapsed().as_secs_f64();

    Ok(Measurement::from_interval(total_bytes, seconds, value))
}

/// Everything one invocation of the harness needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path of the store file to measure.
    pub file: PathBuf,
    /// Path of the result log.
    pub csv: PathBuf,
    /// Dataset names, measured in the order given.
    pub datasets: Vec<String>,
    /// Timed-region kind for every dataset of this run.
    pub test: TestKind,
    /// Implementation label written to each row.
    pub impl_label: String,
    /// Explicit timestamp override; empty means generate one for the run.
    pub timestamp: String,
    /// Abort-first or keep-going on per-dataset failure.
    pub policy: FailurePolicy,
}

/// Outcome of a completed run. Under [`FailurePolicy::AbortFirst`] a
/// failing run surfaces as an `Err` instead and `failures` stays empty.
#[derive(Debug)]
pub struct RunSummary {
    /// Rows durably appended to the log.
    pub rows_appended: usize,
    /// Datasets that failed, with their errors, under keep-going.
    pub failures: Vec<(String, BenchError)>,
}

impl RunSummary {
    /// True when every requested dataset produced a row.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Drive one benchmark invocation: validate the store path, ensure the
/// log exists, then measure and append each dataset in order.
///
/// A missing store file fails before the log is touched. Rows are
/// appended one at a time immediately after each measurement, so a run
/// that fails on dataset N leaves rows for datasets 1..N-1 recorded.
pub fn run(opts: &RunOptions) -> Result<RunSummary> {
    if !opts.file.exists() {
        return Err(BenchError::StoreNotFound(opts.file.clone()));
    }
    results::ensure_log(&opts.csv)?;
    let timestamp = results::resolve_timestamp(&opts.timestamp);

    let mut summary = RunSummary {
        rows_appended: 0,
        failures: Vec::new(),
    };
    for dataset in &opts.datasets {
        let measurement = match measure(&opts.file, dataset, opts.test) {
            Ok(measurement) => measurement,
            Err(err) => match opts.policy {
                FailurePolicy::AbortFirst => return Err(err),
                FailurePolicy::KeepGoing => {
                    warn!(dataset = %dataset, error = %err, "dataset failed, continuing");
                    summary.failures.push((dataset.clone(), err));
                    continue;
                }
            },
        };
        let row = ResultRow {
            timestamp: timestamp.clone(),
            test: opts.test,
            impl_label: opts.impl_label.clone(),
            file: opts.file.display().to_string(),
            dataset: dataset.clone(),
            seconds: measurement.seconds,
            mb_s: measurement.mb_s,
            value: measurement.value,
        };
        results::append_row(&opts.csv, &row)?;
        summary.rows_appended += 1;
        info!(
            dataset = %dataset,
            seconds = measurement.seconds,
            mb_s = measurement.mb_s,
            "measurement appended"
        );
    }
    Ok(summary)
}
