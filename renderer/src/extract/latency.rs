//! Latency aggregation from `@Statistics LATENCY`.
//!
//! The P99 column arrives in microseconds; the surfaced figures are
//! milliseconds. The cluster-level figure is the worst per-host P99.

use common::models::metrics::{ClusterLatency, NodeLatency};
use common::response::ResultTable;
use common::utils::micros_to_millis;

use crate::columns::ColumnMap;

pub fn extract(table: &ResultTable, target: &mut ClusterLatency) {
    let columns = ColumnMap::resolve(table, &["HOSTNAME", "P99", "TPS", "TIMESTAMP"]);
    let mut cluster_p99_micros = f64::MIN;

    for row in &table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        let p99_micros = columns.f64(row, "P99").unwrap_or_default();
        cluster_p99_micros = cluster_p99_micros.max(p99_micros);

        target.nodes.insert(
            hostname.clone(),
            NodeLatency {
                hostname,
                p99_ms: micros_to_millis(p99_micros),
                transactions_per_sec: columns.f64(row, "TPS").unwrap_or_default(),
                timestamp: columns.i64(row, "TIMESTAMP").unwrap_or_default(),
            },
        );
    }

    if !target.nodes.is_empty() {
        target.cluster_p99_ms = micros_to_millis(cluster_p99_micros);
    }
}
