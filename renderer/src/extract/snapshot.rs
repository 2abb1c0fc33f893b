//! Snapshot listings from `@Statistics SNAPSHOTSTATUS` and `@SnapshotScan`.

use std::collections::HashMap;

use common::models::metrics::{SnapshotEntry, SnapshotScanEntry};
use common::response::ResultTable;

use crate::columns::ColumnMap;

/// Groups completed snapshot writes per host.
pub fn extract_status(table: &ResultTable, target: &mut HashMap<String, Vec<SnapshotEntry>>) {
    let columns = ColumnMap::resolve(
        table,
        &["HOSTNAME", "TIMESTAMP", "PATH", "START_TIME", "END_TIME"],
    );
    for row in &table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        target.entry(hostname).or_default().push(SnapshotEntry {
            path: columns.string(row, "PATH").unwrap_or_default(),
            start_time: columns.i64(row, "START_TIME").unwrap_or_default(),
            end_time: columns.i64(row, "END_TIME").unwrap_or_default(),
            timestamp: columns.i64(row, "TIMESTAMP").unwrap_or_default(),
        });
    }
}

/// Collects the restorable snapshots a scan found.
pub fn extract_scan(table: &ResultTable, target: &mut Vec<SnapshotScanEntry>) {
    let columns = ColumnMap::resolve(table, &["PATH", "NONCE", "CREATED", "SIZE", "COMPLETE"]);
    for row in &table.data {
        let Some(nonce) = columns.string(row, "NONCE") else {
            continue;
        };
        target.push(SnapshotScanEntry {
            path: columns.string(row, "PATH").unwrap_or_default(),
            nonce,
            created: columns.i64(row, "CREATED").unwrap_or_default(),
            size: columns.i64(row, "SIZE").unwrap_or_default(),
            complete: columns
                .str(row, "COMPLETE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or_default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn groups_snapshots_per_host() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "HOSTNAME", "type": 9},
                {"name": "PATH", "type": 9},
                {"name": "START_TIME", "type": 6},
                {"name": "END_TIME", "type": 6},
                {"name": "TIMESTAMP", "type": 6}
            ],
            "data": [
                ["h1", "/snap/a", 1, 2, 10],
                ["h1", "/snap/b", 3, 4, 10],
                ["h2", "/snap/a", 1, 2, 10]
            ]
        }))
        .unwrap();

        let mut status = HashMap::new();
        extract_status(&table, &mut status);
        assert_eq!(status["h1"].len(), 2);
        assert_eq!(status["h2"].len(), 1);
        assert_eq!(status["h1"][1].path, "/snap/b");
    }

    #[test]
    fn scan_parses_completeness_flag() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "PATH", "type": 9},
                {"name": "NONCE", "type": 9},
                {"name": "CREATED", "type": 6},
                {"name": "SIZE", "type": 6},
                {"name": "COMPLETE", "type": 9}
            ],
            "data": [
                ["/snap", "auto1", 100, 2048, "TRUE"],
                ["/snap", "auto2", 200, 1024, "FALSE"]
            ]
        }))
        .unwrap();

        let mut scan = Vec::new();
        extract_scan(&table, &mut scan);
        assert!(scan[0].complete);
        assert!(!scan[1].complete);
        assert_eq!(scan[1].size, 1024);
    }
}
