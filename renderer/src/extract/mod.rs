//! Result extractors.
//!
//! One module per statistic family. Every extractor follows the same shape:
//! resolve the needed columns by name, fold the rows into a keyed aggregate,
//! and do nothing when the input is absent or missing columns. An untouched
//! aggregate is the normal degraded-data outcome, not an error.

pub mod commandlog;
pub mod cpu;
pub mod dr;
pub mod idle_time;
pub mod latency;
pub mod memory;
pub mod overview;
pub mod procedures;
pub mod snapshot;
pub mod tables;
