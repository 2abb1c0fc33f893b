//! Per-host command-log backlog from `@Statistics COMMANDLOG`.

use std::collections::HashMap;

use common::models::metrics::CommandLogStats;
use common::response::ResultTable;

use crate::columns::ColumnMap;

const WANTED: &[&str] = &[
    "HOSTNAME",
    "TIMESTAMP",
    "OUTSTANDING_BYTES",
    "OUTSTANDING_TXNS",
    "SEGMENT_COUNT",
    "IN_USE_SEGMENT_COUNT",
    "FSYNC_INTERVAL",
];

pub fn extract(table: &ResultTable, target: &mut HashMap<String, CommandLogStats>) {
    let columns = ColumnMap::resolve(table, WANTED);
    for row in &table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        target.insert(
            hostname.clone(),
            CommandLogStats {
                hostname,
                outstanding_bytes: columns.f64(row, "OUTSTANDING_BYTES").unwrap_or_default(),
                outstanding_txns: columns.f64(row, "OUTSTANDING_TXNS").unwrap_or_default(),
                segment_count: columns.i64(row, "SEGMENT_COUNT").unwrap_or_default(),
                in_use_segment_count: columns
                    .i64(row, "IN_USE_SEGMENT_COUNT")
                    .unwrap_or_default(),
                fsync_interval: columns.i64(row, "FSYNC_INTERVAL").unwrap_or_default(),
                timestamp: columns.i64(row, "TIMESTAMP").unwrap_or_default(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn folds_backlog_per_host() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "HOSTNAME", "type": 9},
                {"name": "OUTSTANDING_BYTES", "type": 6},
                {"name": "OUTSTANDING_TXNS", "type": 6},
                {"name": "SEGMENT_COUNT", "type": 5},
                {"name": "IN_USE_SEGMENT_COUNT", "type": 5},
                {"name": "FSYNC_INTERVAL", "type": 5},
                {"name": "TIMESTAMP", "type": 6}
            ],
            "data": [["h1", 1024, 12, 4, 2, 200, 99]]
        }))
        .unwrap();

        let mut stats = HashMap::new();
        extract(&table, &mut stats);

        let h1 = &stats["h1"];
        assert_eq!(h1.outstanding_bytes, 1024.0);
        assert_eq!(h1.outstanding_txns, 12.0);
        assert_eq!(h1.in_use_segment_count, 2);
        assert_eq!(h1.fsync_interval, 200);
    }
}
