//! Wire-level response shapes.
//!
//! The administrative endpoint answers every procedure call with the same
//! envelope: `{status, statusstring, results: [{schema, data}]}`. Column
//! positions inside a table are NOT stable across server versions; consumers
//! must resolve columns by `schema[i].name` before indexing `data` rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Server status code: the call succeeded.
pub const STATUS_SUCCESS: i32 = 1;
/// Synthetic status code for client-side failures (encoding, transport,
/// timeout).
pub const STATUS_ERROR: i32 = -1;
/// Server status code: the feature is unavailable in this edition.
pub const STATUS_UNSUPPORTED: i32 = -2;
/// Server status code: authentication was rejected.
pub const STATUS_AUTH_REJECTED: i32 = -3;
/// Synthetic status code: the server did not answer a connection probe.
pub const STATUS_UNAVAILABLE: i32 = -100;

/// Fixed status string used for synthesized call timeouts.
pub const QUERY_TIMEOUT_MESSAGE: &str = "Query timeout.";

/// One column of a result table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name; the only reliable way to locate a column.
    pub name: String,
    /// Server type code for the column.
    #[serde(rename = "type", default)]
    pub column_type: i32,
}

/// One tabular result: a schema plus positional row data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultTable {
    #[serde(default)]
    pub schema: Vec<ColumnInfo>,
    #[serde(default)]
    pub data: Vec<Vec<Value>>,
}

/// The full procedure-call response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSet {
    pub status: i32,
    #[serde(default)]
    pub statusstring: String,
    #[serde(default)]
    pub results: Vec<ResultTable>,
}

impl ResultSet {
    /// Builds a synthetic failure response with the given reason.
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR,
            statusstring: reason.into(),
            results: Vec::new(),
        }
    }

    /// Builds the synthetic response used when a call deadline elapses.
    pub fn timeout() -> Self {
        Self::error(QUERY_TIMEOUT_MESSAGE)
    }

    /// Builds the synthetic response used when a connection probe gets no
    /// answer at all.
    pub fn unavailable() -> Self {
        Self {
            status: STATUS_UNAVAILABLE,
            statusstring: "Server is not available.".into(),
            results: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// One decoded entry in a connection's metadata map.
///
/// Procedure calls store their first table under the base key, every table
/// under `<key>_completeData`, and the status pair under `<key>_status` /
/// `<key>_statusstring`. Short API calls store the raw JSON object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetadataEntry {
    Table(ResultTable),
    Tables(Vec<ResultTable>),
    Json(Value),
    Status(i32),
    Text(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_timeout_has_fixed_status_string() {
        let rs = ResultSet::timeout();
        assert_eq!(rs.status, STATUS_ERROR);
        assert_eq!(rs.statusstring, QUERY_TIMEOUT_MESSAGE);
        assert!(rs.results.is_empty());
        assert!(!rs.is_success());
    }

    #[test]
    fn deserializes_envelope_with_missing_optionals() {
        let rs: ResultSet = serde_json::from_str(r#"{"status":1}"#).unwrap();
        assert!(rs.is_success());
        assert!(rs.results.is_empty());

        let rs: ResultSet = serde_json::from_str(
            r#"{"status":1,"statusstring":"","results":[{"schema":[{"name":"HOSTNAME","type":9}],"data":[["h1"]]}]}"#,
        )
        .unwrap();
        assert_eq!(rs.results[0].schema[0].name, "HOSTNAME");
        assert_eq!(rs.results[0].data[0][0], serde_json::json!("h1"));
    }
}
