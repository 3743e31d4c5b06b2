//! Benchmark harness for array-store dataset reads.
//!
//! Times dataset reads (and an optional mean reduction) against named
//! datasets inside a binary array-store file, appending one row per
//! measurement to an append-only CSV log. A reporting stage loads that
//! log and produces grouped per-metric summaries comparing throughput
//! and latency across implementations, datasets, and test kinds.

#![warn(missing_docs)]

pub mod bench;
pub mod error;
pub mod report;
pub mod results;
pub mod store;
