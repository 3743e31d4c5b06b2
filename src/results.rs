//! The result log: schema, timestamps, and the append-only CSV writer.
//!
//! The log is the durable ledger downstream tooling consumes. Its column
//! names and order are a wire contract; they must not change without a
//! compatibility note, since consumers infer meaning positionally.

use std::fs::{self, OpenOptions};
use std::path::Path;

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::debug;

use crate::bench::TestKind;
use crate::error::Result;

/// Ordered column names of the result log. All writers and readers agree
/// on this order.
pub const SCHEMA: [&str; 8] = [
    "timestamp",
    "test",
    "impl",
    "file",
    "dataset",
    "seconds",
    "mb_s",
    "value",
];

/// One fully-constructed measurement row.
///
/// Numeric fields stay as `f64` here; fixed-precision text is produced
/// only at append time so formatting rules live in one place.
#[derive(Debug, Clone)]
pub struct ResultRow {
    /// ISO-8601 UTC stamp, shared across all rows of one invocation.
    pub timestamp: String,
    /// Test kind that produced the measurement.
    pub test: TestKind,
    /// Free-form implementation label for cross-implementation comparison.
    pub impl_label: String,
    /// Path of the measured store file as given by the caller.
    pub file: String,
    /// Name of the measured dataset.
    pub dataset: String,
    /// Wall-clock duration of the timed region.
    pub seconds: f64,
    /// Derived throughput in MiB/s.
    pub mb_s: f64,
    /// Mean for `compute-avg`, absent for pure reads.
    pub value: Option<f64>,
}

impl ResultRow {
    /// Render the row in schema order as fixed-precision decimal text.
    pub fn to_record(&self) -> [String; 8] {
        [
            self.timestamp.clone(),
            self.test.label().to_string(),
            self.impl_label.clone(),
            self.file.clone(),
            self.dataset.clone(),
            format!("{:.6}", self.seconds),
            format!("{:.2}", self.mb_s),
            self.value.map(|v| format_sig(v, 10)).unwrap_or_default(),
        ]
    }
}

/// Return `explicit` verbatim when non-empty, otherwise the current UTC
/// time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn resolve_timestamp(explicit: &str) -> String {
    if !explicit.is_empty() {
        return explicit.to_string();
    }
    let fmt = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");
    OffsetDateTime::now_utc()
        .format(&fmt)
        .expect("static timestamp format")
}

/// Create the log's parent directories and write the header row iff the
/// file is absent or zero-length. Safe to call before every run.
pub fn ensure_log(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(_) => true,
    };
    if needs_header {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(SCHEMA)?;
        writer.flush()?;
        debug!(path = %path.display(), "created result log with header");
    }
    Ok(())
}

/// Append exactly one row, flushed to storage before returning. The file
/// handle is scoped to this call; prior rows are never rewritten.
pub fn append_row(path: &Path, row: &ResultRow) -> Result<()> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(row.to_record())?;
    writer.flush()?;
    Ok(())
}

/// Format with at most `digits` significant digits, trimming trailing
/// zeros, the way the `value` column is written.
pub fn format_sig(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if exp < -4 || exp >= digits as i32 {
        let precision = digits.saturating_sub(1);
        let formatted = format!("{value:.precision$e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{exponent}", trim_decimal(mantissa)),
            None => formatted,
        }
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_decimal(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_decimal(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
