//! Shared data models.

pub mod catalog;
pub mod connection;
pub mod metrics;

pub use connection::{ConnectionOptions, Purpose, SessionSettings};
