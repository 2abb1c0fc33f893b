//! Per-host CPU usage from `@Statistics CPU`.

use std::collections::HashMap;

use common::models::metrics::CpuUsage;
use common::response::ResultTable;

use crate::columns::ColumnMap;

pub fn extract(table: &ResultTable, target: &mut HashMap<String, CpuUsage>) {
    let columns = ColumnMap::resolve(table, &["HOSTNAME", "PERCENT_USED", "TIMESTAMP"]);
    for row in &table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        target.insert(
            hostname.clone(),
            CpuUsage {
                hostname,
                percent_used: columns.f64(row, "PERCENT_USED").unwrap_or_default(),
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
    fn keys_by_hostname() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "TIMESTAMP", "type": 6},
                {"name": "HOSTNAME", "type": 9},
                {"name": "PERCENT_USED", "type": 6}
            ],
            "data": [[10, "h1", 42], [10, "h2", 7]]
        }))
        .unwrap();

        let mut cpu = HashMap::new();
        extract(&table, &mut cpu);
        assert_eq!(cpu["h1"].percent_used, 42.0);
        assert_eq!(cpu["h2"].percent_used, 7.0);
    }
}
