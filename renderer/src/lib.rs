//! Aggregation layer over the connection client.
//!
//! `extract` holds the pure result-table folders; `facade` owns the
//! registry, per-purpose refresh gates, and session settings, and is the
//! surface a UI polls.

pub mod columns;
pub mod extract;
pub mod facade;

pub use columns::ColumnMap;
pub use facade::{FeatureResult, Renderer};
