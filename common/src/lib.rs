//! Shared types for the cluster console core.
//!
//! Contains the wire-level result shapes returned by the cluster's
//! administrative HTTP endpoint, the view models the extractors produce,
//! configuration, and the common error type.

pub mod config;
pub mod errors;
pub mod models;
pub mod response;
pub mod utils;

pub use config::AppConfig;
pub use errors::{AppError, AppResult};
pub use response::{ColumnInfo, MetadataEntry, ResultSet, ResultTable};
