//! Per-host memory aggregation from `@Statistics MEMORY`.

use std::collections::HashMap;

use common::models::metrics::MemoryUsage;
use common::response::ResultTable;
use common::utils::round2;

use crate::columns::ColumnMap;

const WANTED: &[&str] = &[
    "HOSTNAME",
    "TIMESTAMP",
    "RSS",
    "JAVAUSED",
    "JAVAUNUSED",
    "TUPLEDATA",
    "TUPLEALLOCATED",
    "INDEXMEMORY",
    "STRINGMEMORY",
    "PHYSICALMEMORY",
];

pub fn extract(table: &ResultTable, target: &mut HashMap<String, MemoryUsage>) {
    let columns = ColumnMap::resolve(table, WANTED);
    for row in &table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        let rss = columns.f64(row, "RSS").unwrap_or_default();
        let physical = columns.f64(row, "PHYSICALMEMORY").unwrap_or_default();
        let usage = if physical > 0.0 {
            round2(rss / physical * 100.0)
        } else {
            0.0
        };

        target.insert(
            hostname.clone(),
            MemoryUsage {
                hostname,
                rss,
                physical_memory: physical,
                memory_usage: usage,
                java_used: columns.f64(row, "JAVAUSED").unwrap_or_default(),
                java_unused: columns.f64(row, "JAVAUNUSED").unwrap_or_default(),
                tuple_data: columns.f64(row, "TUPLEDATA").unwrap_or_default(),
                tuple_allocated: columns.f64(row, "TUPLEALLOCATED").unwrap_or_default(),
                index_memory: columns.f64(row, "INDEXMEMORY").unwrap_or_default(),
                string_memory: columns.f64(row, "STRINGMEMORY").unwrap_or_default(),
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
    fn computes_usage_percentage_per_host() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "TIMESTAMP", "type": 6},
                {"name": "HOSTNAME", "type": 9},
                {"name": "RSS", "type": 6},
                {"name": "PHYSICALMEMORY", "type": 6}
            ],
            "data": [
                [1000, "h1", 500000000i64, 1000000000i64],
                [1000, "h2", 250000000i64, 1000000000i64]
            ]
        }))
        .unwrap();

        let mut usage = HashMap::new();
        extract(&table, &mut usage);

        assert_eq!(usage["h1"].memory_usage, 50.0);
        assert_eq!(usage["h2"].memory_usage, 25.0);
        assert_eq!(usage["h1"].rss, 500000000.0);
    }

    #[test]
    fn column_order_does_not_matter() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "PHYSICALMEMORY", "type": 6},
                {"name": "RSS", "type": 6},
                {"name": "HOSTNAME", "type": 9}
            ],
            "data": [[1000000000i64, 500000000i64, "h1"]]
        }))
        .unwrap();

        let mut usage = HashMap::new();
        extract(&table, &mut usage);
        assert_eq!(usage["h1"].memory_usage, 50.0);
    }

    #[test]
    fn empty_table_leaves_target_untouched() {
        let mut usage = HashMap::new();
        extract(&ResultTable::default(), &mut usage);
        assert!(usage.is_empty());
    }
}
