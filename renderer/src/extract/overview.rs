//! Cluster identity and workload totals: `@SystemInformation OVERVIEW`,
//! `@SystemInformation DEPLOYMENT`, `@Statistics LIVECLIENTS`, and
//! `@Statistics IMPORTER`.

use std::collections::HashMap;

use common::models::metrics::{
    DeploymentCounts, ImporterStats, LiveClientTotals, SystemOverview,
};
use common::response::ResultTable;

use crate::columns::ColumnMap;

/// Folds the OVERVIEW key/value rows into one identity block per host id.
pub fn extract_overview(table: &ResultTable, target: &mut HashMap<i64, SystemOverview>) {
    let columns = ColumnMap::resolve(table, &["HOST_ID", "KEY", "VALUE"]);
    for row in &table.data {
        let Some(host_id) = columns.i64(row, "HOST_ID") else {
            continue;
        };
        let (Some(key), Some(value)) =
            (columns.str(row, "KEY"), columns.string(row, "VALUE"))
        else {
            continue;
        };
        let entry = target.entry(host_id).or_default();
        match key {
            "HOSTNAME" => entry.hostname = value,
            "IPADDRESS" => entry.ip_address = value,
            "VERSION" => entry.version = value,
            "CLUSTERSTATE" => entry.cluster_state = value,
            "UPTIME" => entry.uptime = value,
            "REPLICATIONROLE" => entry.replication_role = value,
            _ => {}
        }
    }
}

/// Reads host count, sites per host, k-factor, and the command-log switch
/// from the DEPLOYMENT property rows.
pub fn extract_deployment(table: &ResultTable, target: &mut DeploymentCounts) {
    let columns = ColumnMap::resolve(table, &["PROPERTY", "VALUE"]);
    for row in &table.data {
        let (Some(property), Some(value)) =
            (columns.str(row, "PROPERTY"), columns.str(row, "VALUE"))
        else {
            continue;
        };
        match property {
            "hostcount" => target.host_count = value.parse().unwrap_or_default(),
            "sitesperhost" => target.sites_per_host = value.parse().unwrap_or_default(),
            "kfactor" => target.kfactor = value.parse().unwrap_or_default(),
            "commandlogenabled" => target.command_log_enabled = value == "true",
            _ => {}
        }
    }
}

/// Sums outstanding bytes, messages, and transactions across every live
/// client connection.
pub fn extract_live_clients(table: &ResultTable, target: &mut LiveClientTotals) {
    let columns = ColumnMap::resolve(
        table,
        &[
            "OUTSTANDING_REQUEST_BYTES",
            "OUTSTANDING_RESPONSE_MESSAGES",
            "OUTSTANDING_TRANSACTIONS",
        ],
    );
    for row in &table.data {
        target.clients += 1;
        target.bytes_pending += columns
            .i64(row, "OUTSTANDING_REQUEST_BYTES")
            .unwrap_or_default();
        target.messages_pending += columns
            .i64(row, "OUTSTANDING_RESPONSE_MESSAGES")
            .unwrap_or_default();
        target.transactions_pending += columns
            .i64(row, "OUTSTANDING_TRANSACTIONS")
            .unwrap_or_default();
    }
}

/// Sums importer counters per importer name across hosts.
pub fn extract_importers(table: &ResultTable, target: &mut HashMap<String, ImporterStats>) {
    let columns = ColumnMap::resolve(
        table,
        &["IMPORTER_NAME", "OUTSTANDING_REQUESTS", "SUCCESSES", "FAILURES"],
    );
    for row in &table.data {
        let Some(name) = columns.string(row, "IMPORTER_NAME") else {
            continue;
        };
        let entry = target.entry(name.clone()).or_insert(ImporterStats {
            importer_name: name,
            ..Default::default()
        });
        entry.outstanding_requests += columns
            .i64(row, "OUTSTANDING_REQUESTS")
            .unwrap_or_default();
        entry.successes += columns.i64(row, "SUCCESSES").unwrap_or_default();
        entry.failures += columns.i64(row, "FAILURES").unwrap_or_default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overview_folds_key_value_rows_per_host() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "HOST_ID", "type": 5},
                {"name": "KEY", "type": 9},
                {"name": "VALUE", "type": 9}
            ],
            "data": [
                [0, "HOSTNAME", "h1"],
                [0, "CLUSTERSTATE", "RUNNING"],
                [0, "VERSION", "11.4"],
                [1, "HOSTNAME", "h2"],
                [1, "CLUSTERSTATE", "PAUSED"]
            ]
        }))
        .unwrap();

        let mut hosts = HashMap::new();
        extract_overview(&table, &mut hosts);

        assert_eq!(hosts[&0].hostname, "h1");
        assert_eq!(hosts[&0].cluster_state, "RUNNING");
        assert_eq!(hosts[&0].version, "11.4");
        assert_eq!(hosts[&1].cluster_state, "PAUSED");
    }

    #[test]
    fn deployment_counts_parse_string_values() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "PROPERTY", "type": 9},
                {"name": "VALUE", "type": 9}
            ],
            "data": [
                ["hostcount", "3"],
                ["sitesperhost", "8"],
                ["kfactor", "1"],
                ["commandlogenabled", "true"]
            ]
        }))
        .unwrap();

        let mut counts = DeploymentCounts::default();
        extract_deployment(&table, &mut counts);
        assert_eq!(counts.host_count, 3);
        assert_eq!(counts.sites_per_host, 8);
        assert_eq!(counts.kfactor, 1);
        assert!(counts.command_log_enabled);
    }

    #[test]
    fn live_client_totals_sum_across_connections() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "HOSTNAME", "type": 9},
                {"name": "OUTSTANDING_REQUEST_BYTES", "type": 6},
                {"name": "OUTSTANDING_RESPONSE_MESSAGES", "type": 6},
                {"name": "OUTSTANDING_TRANSACTIONS", "type": 6}
            ],
            "data": [
                ["h1", 100, 2, 1],
                ["h2", 50, 3, 4]
            ]
        }))
        .unwrap();

        let mut totals = LiveClientTotals::default();
        extract_live_clients(&table, &mut totals);
        assert_eq!(totals.clients, 2);
        assert_eq!(totals.bytes_pending, 150);
        assert_eq!(totals.messages_pending, 5);
        assert_eq!(totals.transactions_pending, 5);
    }

    #[test]
    fn importer_counters_accumulate_per_name() {
        let table: ResultTable = serde_json::from_value(json!({
            "schema": [
                {"name": "IMPORTER_NAME", "type": 9},
                {"name": "OUTSTANDING_REQUESTS", "type": 6},
                {"name": "SUCCESSES", "type": 6},
                {"name": "FAILURES", "type": 6}
            ],
            "data": [
                ["KafkaImporter", 5, 100, 1],
                ["KafkaImporter", 2, 50, 0]
            ]
        }))
        .unwrap();

        let mut importers = HashMap::new();
        extract_importers(&table, &mut importers);
        assert_eq!(importers["KafkaImporter"].successes, 150);
        assert_eq!(importers["KafkaImporter"].outstanding_requests, 7);
        assert_eq!(importers["KafkaImporter"].failures, 1);
    }
}
