//! Database replication extractors: `@Statistics DR`, `DRROLE`,
//! `DRCONSUMER`, and `DRPRODUCER`.

use std::collections::HashMap;

use tracing::warn;

use common::models::metrics::{
    DrConsumerSample, DrDetails, DrHostStatus, DrPairReplication, DrPartitionSample,
    DrProducerState, DrReplicationGraph, DrRoleEntry, DrStatusView,
};
use common::response::ResultTable;

use crate::columns::ColumnMap;

fn pair_key(cluster_id: i64, remote_cluster_id: i64) -> String {
    format!("{cluster_id}_{remote_cluster_id}")
}

/// Per-host producer state from the node table (second table of
/// `@Statistics DR`).
pub fn extract_status(node_table: &ResultTable, target: &mut DrStatusView) {
    let columns = ColumnMap::resolve(node_table, &["HOSTNAME", "STATE", "SYNCSNAPSHOTSTATE"]);
    for row in &node_table.data {
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        let state = columns.string(row, "STATE").unwrap_or_default();
        target.hosts.insert(
            hostname.clone(),
            DrHostStatus {
                hostname,
                master_enabled: !state.eq_ignore_ascii_case("off") && !state.is_empty(),
                state,
                sync_snapshot_state: columns
                    .string(row, "SYNCSNAPSHOTSTATE")
                    .unwrap_or_default(),
            },
        );
    }
}

/// Per-partition buffer detail from the partition table (first table of
/// `@Statistics DR`). Only producing rows (`MODE == "NORMAL"`) count.
pub fn extract_details(partition_table: &ResultTable, target: &mut DrDetails) {
    let columns = ColumnMap::resolve(
        partition_table,
        &[
            "PARTITION_ID",
            "CLUSTER_ID",
            "REMOTE_CLUSTER_ID",
            "MODE",
            "TOTALBUFFERS",
            "TOTALBYTES",
            "TIMESTAMP",
            "LASTQUEUEDDRID",
            "LASTACKDRID",
            "LASTQUEUEDTIMESTAMP",
            "LASTACKTIMESTAMP",
        ],
    );
    for row in &partition_table.data {
        let cluster_id = columns.i64(row, "CLUSTER_ID").unwrap_or_default();
        target.cluster_id = cluster_id;
        if columns.str(row, "MODE") != Some("NORMAL") {
            continue;
        }
        let remote = columns.i64(row, "REMOTE_CLUSTER_ID").unwrap_or_default();
        let partition = columns.i64(row, "PARTITION_ID").unwrap_or_default();
        target
            .pairs
            .entry(pair_key(cluster_id, remote))
            .or_default()
            .entry(partition)
            .or_default()
            .push(DrPartitionSample {
                total_buffers: columns.i64(row, "TOTALBUFFERS").unwrap_or_default(),
                total_bytes: columns.i64(row, "TOTALBYTES").unwrap_or_default(),
                last_queued_drid: columns.i64(row, "LASTQUEUEDDRID").unwrap_or_default(),
                last_acked_drid: columns.i64(row, "LASTACKDRID").unwrap_or_default(),
                last_queued_timestamp: columns
                    .i64(row, "LASTQUEUEDTIMESTAMP")
                    .unwrap_or_default(),
                last_acked_timestamp: columns
                    .i64(row, "LASTACKTIMESTAMP")
                    .unwrap_or_default(),
                remote_cluster_id: remote,
                timestamp: columns.i64(row, "TIMESTAMP").unwrap_or_default(),
            });
    }
}

/// Role rows from `@Statistics DRROLE`.
pub fn extract_role(table: &ResultTable, target: &mut Vec<DrRoleEntry>) {
    let columns = ColumnMap::resolve(table, &["ROLE", "STATE", "REMOTE_CLUSTER_ID"]);
    for row in &table.data {
        let Some(role) = columns.string(row, "ROLE") else {
            continue;
        };
        target.push(DrRoleEntry {
            role,
            state: columns.string(row, "STATE").unwrap_or_default(),
            remote_cluster_id: columns.i64(row, "REMOTE_CLUSTER_ID").unwrap_or_default(),
        });
    }
}

/// Consumer state per host from `@Statistics DRCONSUMER`. Hostnames arrive
/// as `host/interface` and are reduced to the host part.
pub fn extract_consumer_state(table: &ResultTable, target: &mut HashMap<String, String>) {
    let columns = ColumnMap::resolve(table, &["HOSTNAME", "STATE"]);
    for row in &table.data {
        let Some(hostname) = columns.str(row, "HOSTNAME") else {
            continue;
        };
        let host = hostname.split('/').next().unwrap_or(hostname).to_string();
        target.insert(host, columns.string(row, "STATE").unwrap_or_default());
    }
}

/// Replication rates per cluster pair from `@Statistics DRCONSUMER`, with
/// the coverage table contributing a warning count for uncovered partitions.
pub fn extract_replication(
    consumer_table: &ResultTable,
    coverage_table: Option<&ResultTable>,
    target: &mut DrReplicationGraph,
) {
    let columns = ColumnMap::resolve(
        consumer_table,
        &[
            "HOSTNAME",
            "HOST_ID",
            "STATE",
            "TIMESTAMP",
            "CLUSTER_ID",
            "REMOTE_CLUSTER_ID",
            "REPLICATION_RATE_1M",
            "REPLICATION_RATE_5M",
        ],
    );
    for row in &consumer_table.data {
        let cluster_id = columns.i64(row, "CLUSTER_ID").unwrap_or_default();
        let remote = columns.i64(row, "REMOTE_CLUSTER_ID").unwrap_or_default();
        let timestamp = columns.i64(row, "TIMESTAMP").unwrap_or_default();
        target.cluster_id = cluster_id;
        target.remote_cluster_id = remote;
        target.timestamp = timestamp;

        let rate_1m = columns.f64(row, "REPLICATION_RATE_1M").unwrap_or_default();
        let rate_5m = columns.f64(row, "REPLICATION_RATE_5M").unwrap_or_default();

        let pair = target.pairs.entry(pair_key(cluster_id, remote)).or_default();
        pair.replication_rate_1m += (rate_1m.max(0.0)) / 1000.0;
        pair.timestamp = timestamp;
        pair.samples.push(DrConsumerSample {
            host_id: columns.i64(row, "HOST_ID").unwrap_or_default(),
            hostname: columns.string(row, "HOSTNAME").unwrap_or_default(),
            state: columns.string(row, "STATE").unwrap_or_default(),
            replication_rate_1m: rate_1m / 1000.0,
            replication_rate_5m: rate_5m / 1000.0,
            timestamp,
        });
    }

    if let Some(coverage) = coverage_table {
        let columns = ColumnMap::resolve(coverage, &["IS_COVERED"]);
        target.warning_count = coverage
            .data
            .iter()
            .filter(|row| {
                columns
                    .str(row, "IS_COVERED")
                    .map(|v| v.eq_ignore_ascii_case("false"))
                    .unwrap_or(false)
            })
            .count();
    }
}

/// Advances the producer watermarks from the partition table of
/// `@Statistics DRPRODUCER`.
///
/// Partitions still holding queued bytes raise `partition_max` with their
/// last queued DR id and lower `partition_min` with the laggiest replica's
/// last acked id; a replica whose buffer drained is removed from the
/// laggards list, and the partition's entries disappear once every replica
/// has drained. State persists across polls so a backward-moving acked id
/// is observable.
pub fn extract_producer(partition_table: &ResultTable, state: &mut DrProducerState) {
    let columns = ColumnMap::resolve(
        partition_table,
        &[
            "PARTITION_ID",
            "HOSTNAME",
            "LASTQUEUEDDRID",
            "LASTACKDRID",
            "TOTALBYTES",
        ],
    );

    // Re-seed each partition's min from its max; this poll's rows pull it
    // back down to the true minimum.
    for (partition, max) in &state.partition_max {
        if let Some(min) = state.partition_min.get_mut(partition) {
            *min = *max;
        }
    }

    for row in &partition_table.data {
        let Some(partition) = columns.i64(row, "PARTITION_ID") else {
            continue;
        };
        let Some(hostname) = columns.string(row, "HOSTNAME") else {
            continue;
        };
        let last_queued = dr_id(&columns, row, "LASTQUEUEDDRID");
        let last_acked = dr_id(&columns, row, "LASTACKDRID");
        if last_queued == -1 && last_acked == -1 {
            continue;
        }

        if columns.i64(row, "TOTALBYTES").unwrap_or_default() > 0 {
            state
                .partition_max
                .entry(partition)
                .and_modify(|max| *max = (*max).max(last_queued))
                .or_insert(last_queued);

            match state.partition_min.get_mut(&partition) {
                Some(min) => {
                    if last_acked < *min {
                        *min = last_acked;
                    }
                }
                None => {
                    state.partition_min.insert(partition, last_acked);
                    state.partition_min_host.insert(partition, Vec::new());
                }
            }
            let hosts = state.partition_min_host.entry(partition).or_default();
            if !hosts.contains(&hostname) {
                hosts.push(hostname);
            }
        } else {
            // This replica's buffer queue drained.
            if state.partition_min.contains_key(&partition) {
                if let Some(hosts) = state.partition_min_host.get_mut(&partition) {
                    hosts.retain(|h| h != &hostname);
                    if hosts.is_empty() {
                        state.partition_min_host.remove(&partition);
                        state.partition_min.remove(&partition);
                    }
                }
            }
            match state.partition_max.get_mut(&partition) {
                Some(max) => {
                    if *max > last_acked {
                        warn!(
                            partition,
                            host = %hostname,
                            last_acked,
                            watermark = *max,
                            "drained partition acked behind the cluster watermark"
                        );
                    }
                    *max = (*max).max(last_acked);
                }
                None => {
                    state.partition_max.insert(partition, last_acked);
                }
            }
        }
    }
}

fn dr_id(columns: &ColumnMap, row: &[serde_json::Value], name: &str) -> i64 {
    match columns.str(row, name) {
        Some("None") => -1,
        _ => columns.i64(row, name).unwrap_or(-1),
    }
}
