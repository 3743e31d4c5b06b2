//! Aggregation stage over the result log.
//!
//! Loads the log leniently (the log is a shared ledger other harnesses
//! append to, so rows may carry junk), groups measurements, and produces
//! per-metric summaries: an aligned table on stdout and one
//! `summary_<metric>.csv` per metric for downstream chart tooling.
//!
//! Coercion rules match the consumer contract of the log: numeric cells
//! that fail to parse become missing rather than erroring, label columns
//! are whitespace-trimmed, and rows missing the metric being summarized
//! are dropped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{BenchError, Result};

/// Metrics the report stage summarizes, one output per metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Throughput in MiB/s.
    MbS,
    /// Timed-region duration in seconds.
    Seconds,
}

impl Metric {
    /// Both metrics in output order.
    pub const ALL: [Metric; 2] = [Metric::MbS, Metric::Seconds];

    /// Column name in the result log.
    pub fn label(self) -> &'static str {
        match self {
            Metric::MbS => "mb_s",
            Metric::Seconds => "seconds",
        }
    }

    fn extract(self, row: &LogRow) -> Option<f64> {
        match self {
            Metric::MbS => row.mb_s,
            Metric::Seconds => row.seconds,
        }
    }
}

/// One leniently-parsed log row.
#[derive(Debug, Clone)]
pub struct LogRow {
    /// Test kind label, trimmed.
    pub test: String,
    /// Implementation label, trimmed.
    pub impl_label: String,
    /// Store file path as recorded.
    pub file: String,
    /// Dataset name, trimmed.
    pub dataset: String,
    /// Duration, missing when the cell did not parse.
    pub seconds: Option<f64>,
    /// Throughput, missing when the cell did not parse.
    pub mb_s: Option<f64>,
    /// Reduction value, missing for pure reads and unparsable cells.
    pub value: Option<f64>,
}

/// Load the result log, coercing numerics and trimming labels.
pub fn load_rows(path: &Path) -> Result<Vec<LogRow>> {
    if !path.exists() {
        return Err(BenchError::InvalidArgument(format!(
            "result log not found: {}",
            path.display()
        )));
    }
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let col_test = column("test");
    let col_impl = column("impl");
    let col_file = column("file");
    let col_dataset = column("dataset");
    let col_seconds = column("seconds");
    let col_mb_s = column("mb_s");
    let col_value = column("value");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let label = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let numeric = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        rows.push(LogRow {
            test: label(col_test),
            impl_label: label(col_impl),
            file: label(col_file),
            dataset: label(col_dataset),
            seconds: numeric(col_seconds),
            mb_s: numeric(col_mb_s),
            value: numeric(col_value),
        });
    }
    debug!(path = %path.display(), rows = rows.len(), "loaded result log");
    Ok(rows)
}

/// Mean of one metric over one (test, dataset, impl) group.
#[derive(Debug, Clone)]
pub struct GroupSummary {
    /// Test kind label.
    pub test: String,
    /// Dataset name.
    pub dataset: String,
    /// Implementation label.
    pub impl_label: String,
    /// Mean of the metric across the group's samples.
    pub mean: f64,
    /// Number of rows contributing to the mean.
    pub samples: usize,
}

/// Group rows by (test, dataset, impl) and average `metric`, dropping
/// rows where the metric is missing. Output order is deterministic.
pub fn summarize(rows: &[LogRow], metric: Metric) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<(String, String, String), (f64, usize)> = BTreeMap::new();
    for row in rows {
        let Some(sample) = metric.extract(row) else {
            continue;
        };
        let key = (
            row.test.clone(),
            row.dataset.clone(),
            row.impl_label.clone(),
        );
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += sample;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|((test, dataset, impl_label), (sum, samples))| GroupSummary {
            test,
            dataset,
            impl_label,
            mean: sum / samples as f64,
            samples,
        })
        .collect()
}

/// Print one aligned table for a metric.
pub fn print_table(metric: Metric, summaries: &[GroupSummary]) {
    println!("\n{} BY DATASET AND IMPLEMENTATION", metric.label().to_uppercase());
    println!(
        "{:<14} {:<20} {:<16} {:>14} {:>8}",
        "TEST",
        "DATASET",
        "IMPL",
        metric.label().to_uppercase(),
        "N"
    );
    for summary in summaries {
        println!(
            "{:<14} {:<20} {:<16} {:>14.6} {:>8}",
            summary.test, summary.dataset, summary.impl_label, summary.mean, summary.samples
        );
    }
}

/// Write one `summary_<metric>.csv` into `out_dir`, creating it as needed.
pub fn write_summary_csv(out_dir: &Path, metric: Metric, summaries: &[GroupSummary]) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!("summary_{}.csv", metric.label()));
    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record(["test", "dataset", "impl", metric.label(), "samples"])?;
    for summary in summaries {
        writer.write_record([
            summary.test.as_str(),
            summary.dataset.as_str(),
            summary.impl_label.as_str(),
            &format!("{:.6}", summary.mean),
            &summary.samples.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(test: &str, dataset: &str, impl_label: &str, mb_s: Option<f64>) -> LogRow {
        LogRow {
            test: test.into(),
            impl_label: impl_label.into(),
            file: "data.arr".into(),
            dataset: dataset.into(),
            seconds: Some(1.0),
            mb_s,
            value: None,
        }
    }

    #[test]
    fn summarize_averages_per_group_and_drops_missing() {
        let rows = vec![
            row("read", "ds1", "refX", Some(100.0)),
            row("read", "ds1", "refX", Some(300.0)),
            row("read", "ds1", "refY", Some(50.0)),
            row("read", "ds2", "refX", None),
        ];
        let summaries = summarize(&rows, Metric::MbS);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].impl_label, "refX");
        assert_eq!(summaries[0].mean, 200.0);
        assert_eq!(summaries[0].samples, 2);
        assert_eq!(summaries[1].impl_label, "refY");
        assert_eq!(summaries[1].mean, 50.0);
    }

    #[test]
    fn seconds_metric_survives_missing_throughput() {
        let rows = vec![row("read", "ds1", "refX", None)];
        let summaries = summarize(&rows, Metric::Seconds);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].mean, 1.0);
    }
}
