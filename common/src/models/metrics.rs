//! Aggregate view models produced by the extractors.
//!
//! Every aggregate is rebuilt wholesale on each poll from the newest result
//! set. The only exception is the DR producer watermarks, which deliberately
//! carry state across polls (see `DrProducerState`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-host memory figures from `@Statistics MEMORY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub hostname: String,
    pub rss: f64,
    pub physical_memory: f64,
    /// `RSS / PHYSICALMEMORY * 100`, rounded to two decimals.
    pub memory_usage: f64,
    pub java_used: f64,
    pub java_unused: f64,
    pub tuple_data: f64,
    pub tuple_allocated: f64,
    pub index_memory: f64,
    pub string_memory: f64,
    pub timestamp: i64,
}

/// Per-host CPU figures from `@Statistics CPU`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuUsage {
    pub hostname: String,
    pub percent_used: f64,
    pub timestamp: i64,
}

/// Per-host latency sample from `@Statistics LATENCY`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeLatency {
    pub hostname: String,
    /// 99th percentile, converted from microseconds to milliseconds.
    pub p99_ms: f64,
    pub transactions_per_sec: f64,
    pub timestamp: i64,
}

/// Cluster-wide latency view: the worst per-host P99 plus each host's sample.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterLatency {
    pub cluster_p99_ms: f64,
    pub nodes: HashMap<String, NodeLatency>,
}

/// Per-host command-log backlog from `@Statistics COMMANDLOG`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandLogStats {
    pub hostname: String,
    pub outstanding_bytes: f64,
    pub outstanding_txns: f64,
    pub segment_count: i64,
    pub in_use_segment_count: i64,
    pub fsync_interval: i64,
    pub timestamp: i64,
}

/// One snapshot write reported by `@Statistics SNAPSHOTSTATUS`, grouped
/// per host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub path: String,
    pub start_time: i64,
    pub end_time: i64,
    pub timestamp: i64,
}

/// One restorable snapshot found by `@SnapshotScan`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotScanEntry {
    pub path: String,
    pub nonce: String,
    pub created: i64,
    pub size: i64,
    pub complete: bool,
}

/// One row of the procedure invocation profile (`@Statistics PROCEDUREPROFILE`).
/// Latency columns arrive in nanoseconds and are converted to milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcedureProfile {
    pub procedure: String,
    pub invocations: i64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub avg_latency: f64,
    pub weighted_perc: f64,
    pub aborts: i64,
    pub failures: i64,
}

/// Statement-level detail for one procedure (`@Statistics PROCEDUREDETAIL`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcedureDetail {
    pub procedure: String,
    pub statement: String,
    pub invocations: i64,
    pub min_latency: f64,
    pub max_latency: f64,
    pub avg_latency: f64,
}

/// Row-count aggregate for one table across its partitions
/// (`@Statistics TABLE`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableStats {
    pub table_name: String,
    /// "Replicated" or "Partitioned".
    pub table_type: String,
    pub min_rows: i64,
    pub max_rows: i64,
    pub avg_rows: i64,
    /// Replicated tables count one partition's tuples; partitioned tables
    /// sum across partitions.
    pub tuple_count: i64,
    /// Number of distinct partitions observed for the table.
    pub partition_count: usize,
}

/// Partition idle percentages from `@Statistics STARVATION`.
///
/// Each host's highest site id hosts the multi-partition initiator; its
/// sample lands in `mpi` instead of `sites`. Hosts other than the polled
/// one contribute only a min/max envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionIdleView {
    /// `"host: site"` -> idle percent, local host only.
    pub sites: HashMap<String, f64>,
    /// `"host: site"` -> idle percent for the MPI site.
    pub mpi: HashMap<String, f64>,
    /// Per remote host, the lowest idle percent across its sites.
    pub host_min: HashMap<String, f64>,
    /// Per remote host, the highest idle percent across its sites.
    pub host_max: HashMap<String, f64>,
    pub timestamp: i64,
}

/// Per-host DR producer state from the node table of `@Statistics DR`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrHostStatus {
    pub hostname: String,
    /// `STATE` other than "off" means the host produces a DR stream.
    pub master_enabled: bool,
    pub state: String,
    pub sync_snapshot_state: String,
}

/// Outcome of a DR status poll: the raw call status plus per-host state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrStatusView {
    pub status: i32,
    pub hosts: HashMap<String, DrHostStatus>,
}

/// One per-partition buffer sample from the partition table of
/// `@Statistics DR` (producing, `MODE == "NORMAL"` rows only).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrPartitionSample {
    pub total_buffers: i64,
    pub total_bytes: i64,
    pub last_queued_drid: i64,
    pub last_acked_drid: i64,
    pub last_queued_timestamp: i64,
    pub last_acked_timestamp: i64,
    pub remote_cluster_id: i64,
    pub timestamp: i64,
}

/// DR partition detail grouped by `clusterId_remoteClusterId` pair, then
/// by partition id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrDetails {
    pub cluster_id: i64,
    pub pairs: HashMap<String, HashMap<i64, Vec<DrPartitionSample>>>,
}

/// One DR role row (`@Statistics DRROLE`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrRoleEntry {
    pub role: String,
    pub state: String,
    pub remote_cluster_id: i64,
}

/// One consumer connection sample, rates scaled from bytes/sec down
/// by 1000.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrConsumerSample {
    pub host_id: i64,
    pub hostname: String,
    pub state: String,
    pub replication_rate_1m: f64,
    pub replication_rate_5m: f64,
    pub timestamp: i64,
}

/// Accumulated replication rate for one cluster pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrPairReplication {
    pub replication_rate_1m: f64,
    pub timestamp: i64,
    pub samples: Vec<DrConsumerSample>,
}

/// Replication-rate view across every observed cluster pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrReplicationGraph {
    pub cluster_id: i64,
    pub remote_cluster_id: i64,
    pub pairs: HashMap<String, DrPairReplication>,
    /// Partitions the consumer coverage table reports as uncovered.
    pub warning_count: usize,
    pub timestamp: i64,
}

/// Watermarks the DR producer extractor carries across polls so a
/// regression in a partition's acked DR id is detectable.
#[derive(Debug, Clone, Default)]
pub struct DrProducerState {
    /// Highest queued DR id seen per partition.
    pub partition_max: HashMap<i64, i64>,
    /// Lowest acked DR id seen per partition.
    pub partition_min: HashMap<i64, i64>,
    /// Hosts whose replica of the partition still holds queued data.
    pub partition_min_host: HashMap<i64, Vec<String>>,
}

/// Deployment figures derived from `@SystemInformation DEPLOYMENT` rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentCounts {
    pub host_count: i64,
    pub sites_per_host: i64,
    pub kfactor: i64,
    pub command_log_enabled: bool,
}

/// Per-host identity block from `@SystemInformation OVERVIEW`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemOverview {
    pub hostname: String,
    pub ip_address: String,
    pub version: String,
    pub cluster_state: String,
    pub uptime: String,
    pub replication_role: String,
}

/// Outcome of a system-overview poll. An authentication rejection
/// (status -3) is a distinct, non-fatal outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SystemInfoView {
    Available {
        hosts: HashMap<i64, SystemOverview>,
        collected_at: DateTime<Utc>,
    },
    PermissionDenied,
}

/// Cluster-wide totals from `@Statistics LIVECLIENTS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LiveClientTotals {
    pub clients: usize,
    pub bytes_pending: i64,
    pub messages_pending: i64,
    pub transactions_pending: i64,
}

/// Per-importer totals from `@Statistics IMPORTER`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImporterStats {
    pub importer_name: String,
    pub outstanding_requests: i64,
    pub successes: i64,
    pub failures: i64,
}

/// Per-stream totals from `@Statistics EXPORT`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExporterStats {
    pub source_name: String,
    pub tuple_count: i64,
    pub tuple_pending: i64,
    pub active: bool,
}
