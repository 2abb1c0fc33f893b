//! The console facade.
//!
//! Every getter is one purpose-tagged poll: acquire the purpose's refresh
//! gate, run the purpose's procedure batch on its own connection, then fold
//! the stored metadata through the matching extractor. A getter returns
//! `None` when the previous poll for that purpose is still in flight, so
//! poll cycles never overlap; callers keep showing the last aggregate.
//! Degraded data (transport failures, missing tables) comes back as an
//! empty aggregate, never as an error.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};
use validator::Validate;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::catalog::SchemaCatalog;
use common::models::connection::{ConnectionOptions, Purpose, SessionSettings};
use common::models::metrics::{
    ClusterLatency, CommandLogStats, CpuUsage, DeploymentCounts, DrDetails, DrProducerState,
    DrReplicationGraph, DrRoleEntry, DrStatusView, ExporterStats, ImporterStats,
    LiveClientTotals, MemoryUsage, PartitionIdleView, ProcedureDetail, ProcedureProfile,
    SnapshotEntry, SnapshotScanEntry, SystemInfoView, SystemOverview, TableStats,
};
use common::response::{ResultSet, STATUS_AUTH_REJECTED, STATUS_UNSUPPORTED};
use connection_client::connection::short_api_key;
use connection_client::{CallKind, ConnectionRegistry, ParamValue, ProcedureCommand};

use crate::extract;

/// Outcome of an operation the server may decline by edition.
#[derive(Debug, Clone)]
pub enum FeatureResult<T> {
    Ready(T),
    /// The server answered `-2`: the feature is absent from this edition.
    Unsupported,
}

/// Releases its purpose's refresh gate when the poll completes.
struct PurposeGate<'a> {
    gates: &'a Mutex<HashSet<Purpose>>,
    purpose: Purpose,
}

impl Drop for PurposeGate<'_> {
    fn drop(&mut self) {
        lock_gates(self.gates).remove(&self.purpose);
    }
}

fn lock_gates(gates: &Mutex<HashSet<Purpose>>) -> std::sync::MutexGuard<'_, HashSet<Purpose>> {
    match gates.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct Renderer {
    registry: ConnectionRegistry,
    settings: tokio::sync::RwLock<SessionSettings>,
    gates: Mutex<HashSet<Purpose>>,
    dr_producer: Mutex<DrProducerState>,
}

impl Renderer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            settings: tokio::sync::RwLock::new(SessionSettings {
                server: config.default_server.clone(),
                port: config.default_port,
                admin: config.admin,
                user: None,
                password: None,
                is_hashed_password: false,
            }),
            gates: Mutex::new(HashSet::new()),
            dr_producer: Mutex::new(DrProducerState::default()),
        }
    }

    /// Host identity pinned from the first response any connection observed.
    pub fn pinned_host(&self) -> Option<&str> {
        self.registry.pinned_host()
    }

    pub async fn current_server(&self) -> String {
        self.settings.read().await.server.clone()
    }

    fn enter(&self, purpose: Purpose) -> Option<PurposeGate<'_>> {
        let mut gates = lock_gates(&self.gates);
        if !gates.insert(purpose) {
            debug!(purpose = %purpose, "previous poll still in flight, skipping");
            return None;
        }
        Some(PurposeGate {
            gates: &self.gates,
            purpose,
        })
    }

    async fn options_for(&self, purpose: Purpose) -> ConnectionOptions {
        let settings = self.settings.read().await;
        ConnectionOptions {
            server: settings.server.clone(),
            port: settings.port,
            admin: settings.admin,
            user: settings.user.clone(),
            password: settings.password.clone(),
            is_hashed_password: settings.is_hashed_password,
            purpose,
        }
    }

    /// One poll cycle for a purpose: gate, run the batch, hand back the
    /// connection whose metadata now holds the decoded results.
    async fn poll(
        &self,
        purpose: Purpose,
        commands: Vec<ProcedureCommand>,
    ) -> Option<std::sync::Arc<connection_client::Connection>> {
        let _gate = self.enter(purpose)?;
        let options = self.options_for(purpose).await;
        let (connection, _) = self.registry.register_with_commands(options, commands).await;
        Some(connection)
    }

    async fn one_shot(&self, purpose: Purpose, kind: CallKind) -> ResultSet {
        let options = self.options_for(purpose).await;
        let connection = self.registry.get_or_create(options).await;
        connection.call_execute(&kind).await
    }

    fn statistics(component: &str) -> ProcedureCommand {
        ProcedureCommand::new(
            "@Statistics",
            vec![ParamValue::from(component), ParamValue::Int(0)],
        )
    }

    // ---- cluster identity -------------------------------------------------

    /// System overview per host. An authentication rejection is reported as
    /// `PermissionDenied`, a distinct outcome rather than an error, so the
    /// caller can stop polling and prompt for credentials.
    pub async fn get_system_information(&self) -> Option<SystemInfoView> {
        let connection = self
            .poll(
                Purpose::SystemInformation,
                vec![
                    ProcedureCommand::new(
                        "@SystemInformation",
                        vec![ParamValue::from("OVERVIEW")],
                    ),
                    Self::statistics("MEMORY"),
                ],
            )
            .await?;
        Some(Self::system_info_view(&connection))
    }

    fn system_info_view(connection: &connection_client::Connection) -> SystemInfoView {
        if connection.metadata_status("@SystemInformation_OVERVIEW")
            == Some(STATUS_AUTH_REJECTED)
        {
            return SystemInfoView::PermissionDenied;
        }
        let mut hosts = HashMap::new();
        if let Some(table) = connection.metadata_table("@SystemInformation_OVERVIEW") {
            extract::overview::extract_overview(&table, &mut hosts);
        }
        SystemInfoView::Available {
            hosts,
            collected_at: Utc::now(),
        }
    }

    pub async fn get_cluster_information(&self) -> Option<HashMap<i64, SystemOverview>> {
        let connection = self
            .poll(
                Purpose::ClusterInformation,
                vec![ProcedureCommand::new(
                    "@SystemInformation",
                    vec![ParamValue::from("OVERVIEW")],
                )],
            )
            .await?;
        let mut hosts = HashMap::new();
        if let Some(table) = connection.metadata_table("@SystemInformation_OVERVIEW") {
            extract::overview::extract_overview(&table, &mut hosts);
        }
        Some(hosts)
    }

    /// Replication role per host, from the OVERVIEW key/value rows.
    pub async fn get_replication_roles(&self) -> Option<HashMap<String, String>> {
        let hosts = self.get_cluster_information().await?;
        Some(
            hosts
                .into_values()
                .filter(|h| !h.hostname.is_empty())
                .map(|h| (h.hostname, h.replication_role))
                .collect(),
        )
    }

    pub async fn get_deployment_information(&self) -> Option<DeploymentCounts> {
        let connection = self
            .poll(
                Purpose::Deployment,
                vec![ProcedureCommand::new(
                    "@SystemInformation",
                    vec![ParamValue::from("DEPLOYMENT")],
                )],
            )
            .await?;
        let mut counts = DeploymentCounts::default();
        if let Some(table) = connection.metadata_table("@SystemInformation_DEPLOYMENT") {
            extract::overview::extract_deployment(&table, &mut counts);
        }
        Some(counts)
    }

    // ---- graphs -----------------------------------------------------------

    pub async fn get_memory_information(&self) -> Option<HashMap<String, MemoryUsage>> {
        let connection = self
            .poll(Purpose::GraphMemory, vec![Self::statistics("MEMORY")])
            .await?;
        let mut usage = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_MEMORY") {
            extract::memory::extract(&table, &mut usage);
        }
        Some(usage)
    }

    pub async fn get_cpu_information(&self) -> Option<HashMap<String, CpuUsage>> {
        let connection = self
            .poll(Purpose::GraphCpu, vec![Self::statistics("CPU")])
            .await?;
        let mut cpu = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_CPU") {
            extract::cpu::extract(&table, &mut cpu);
        }
        Some(cpu)
    }

    pub async fn get_latency_information(&self) -> Option<ClusterLatency> {
        let connection = self
            .poll(Purpose::GraphLatency, vec![Self::statistics("LATENCY")])
            .await?;
        let mut latency = ClusterLatency::default();
        if let Some(table) = connection.metadata_table("@Statistics_LATENCY") {
            extract::latency::extract(&table, &mut latency);
        }
        Some(latency)
    }

    pub async fn get_partition_idle_time(&self) -> Option<PartitionIdleView> {
        let connection = self
            .poll(
                Purpose::PartitionIdleTime,
                vec![Self::statistics("STARVATION")],
            )
            .await?;
        let local_host = self.current_server().await;
        let mut view = PartitionIdleView::default();
        if let Some(table) = connection.metadata_table("@Statistics_STARVATION") {
            extract::idle_time::extract(&table, &local_host, &mut view);
        }
        Some(view)
    }

    // ---- storage ----------------------------------------------------------

    pub async fn get_table_information(&self) -> Option<HashMap<String, TableStats>> {
        let connection = self
            .poll(Purpose::TableInformation, vec![Self::statistics("TABLE")])
            .await?;
        let mut stats = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_TABLE") {
            extract::tables::extract_stats(&table, &mut stats);
        }
        Some(stats)
    }

    pub async fn get_schema_catalog(&self) -> Option<SchemaCatalog> {
        let connection = self
            .poll(
                Purpose::SchemaCatalog,
                vec![
                    ProcedureCommand::new("@SystemCatalog", vec![ParamValue::from("TABLES")]),
                    ProcedureCommand::new("@SystemCatalog", vec![ParamValue::from("COLUMNS")]),
                    ProcedureCommand::new(
                        "@SystemCatalog",
                        vec![ParamValue::from("PROCEDURES")],
                    ),
                    Self::statistics("INDEX"),
                ],
            )
            .await?;
        let mut catalog = SchemaCatalog::default();
        if let Some(table) = connection.metadata_table("@SystemCatalog_TABLES") {
            extract::tables::extract_relations(&table, &mut catalog);
        }
        if let Some(table) = connection.metadata_table("@SystemCatalog_COLUMNS") {
            extract::tables::extract_columns(&table, &mut catalog);
        }
        if let Some(table) = connection.metadata_table("@SystemCatalog_PROCEDURES") {
            extract::tables::extract_procedures(&table, &mut catalog);
        }
        if let Some(table) = connection.metadata_table("@Statistics_INDEX") {
            extract::tables::extract_indexes(&table, &mut catalog);
        }
        Some(catalog)
    }

    // ---- procedures -------------------------------------------------------

    pub async fn get_procedure_profile(&self) -> Option<Vec<ProcedureProfile>> {
        let connection = self
            .poll(
                Purpose::ProcedureProfile,
                vec![Self::statistics("PROCEDUREPROFILE")],
            )
            .await?;
        let mut profile = Vec::new();
        if let Some(table) = connection.metadata_table("@Statistics_PROCEDUREPROFILE") {
            extract::procedures::extract_profile(&table, &mut profile);
        }
        Some(profile)
    }

    pub async fn get_procedure_detail(&self) -> Option<Vec<ProcedureDetail>> {
        let connection = self
            .poll(
                Purpose::ProcedureDetail,
                vec![Self::statistics("PROCEDUREDETAIL")],
            )
            .await?;
        let mut detail = Vec::new();
        if let Some(table) = connection.metadata_table("@Statistics_PROCEDUREDETAIL") {
            extract::procedures::extract_detail(&table, &mut detail);
        }
        Some(detail)
    }

    // ---- durability -------------------------------------------------------

    pub async fn get_command_log_information(
        &self,
    ) -> Option<HashMap<String, CommandLogStats>> {
        let connection = self
            .poll(Purpose::CommandLog, vec![Self::statistics("COMMANDLOG")])
            .await?;
        let mut stats = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_COMMANDLOG") {
            extract::commandlog::extract(&table, &mut stats);
        }
        Some(stats)
    }

    pub async fn get_snapshot_status(
        &self,
    ) -> Option<HashMap<String, Vec<SnapshotEntry>>> {
        let connection = self
            .poll(
                Purpose::SnapshotStatus,
                vec![Self::statistics("SNAPSHOTSTATUS")],
            )
            .await?;
        let mut status = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_SNAPSHOTSTATUS") {
            extract::snapshot::extract_status(&table, &mut status);
        }
        Some(status)
    }

    pub async fn scan_snapshots(
        &self,
        path: &str,
    ) -> Option<FeatureResult<Vec<SnapshotScanEntry>>> {
        let connection = self
            .poll(
                Purpose::SnapshotScan,
                vec![ProcedureCommand::new(
                    "@SnapshotScan",
                    vec![ParamValue::from(path)],
                )],
            )
            .await?;
        Some(Self::snapshot_scan_view(&connection, path))
    }

    fn snapshot_scan_view(
        connection: &connection_client::Connection,
        path: &str,
    ) -> FeatureResult<Vec<SnapshotScanEntry>> {
        let key = format!("@SnapshotScan_{path}");
        if connection.metadata_status(&key) == Some(STATUS_UNSUPPORTED) {
            return FeatureResult::Unsupported;
        }
        let mut entries = Vec::new();
        if let Some(table) = connection.metadata_table(&key) {
            extract::snapshot::extract_scan(&table, &mut entries);
        }
        FeatureResult::Ready(entries)
    }

    pub async fn save_snapshot(&self, path: &str, nonce: &str, blocking: bool) -> ResultSet {
        self.one_shot(
            Purpose::SnapshotSave,
            CallKind::procedure(
                "@SnapshotSave",
                vec![
                    ParamValue::from(path),
                    ParamValue::from(nonce),
                    ParamValue::Bool(blocking),
                ],
            ),
        )
        .await
    }

    pub async fn restore_snapshot(&self, path: &str, nonce: &str) -> ResultSet {
        self.one_shot(
            Purpose::SnapshotRestore,
            CallKind::procedure(
                "@SnapshotRestore",
                vec![ParamValue::from(path), ParamValue::from(nonce)],
            ),
        )
        .await
    }

    /// Deletes one snapshot. `-2` means snapshot management is absent from
    /// this edition; that is reported as `Unsupported`, not failure.
    pub async fn delete_snapshot(
        &self,
        path: &str,
        nonce: &str,
    ) -> FeatureResult<ResultSet> {
        let result = self
            .one_shot(
                Purpose::SnapshotDelete,
                CallKind::procedure(
                    "@SnapshotDelete",
                    vec![ParamValue::from(path), ParamValue::from(nonce)],
                ),
            )
            .await;
        if result.status == STATUS_UNSUPPORTED {
            FeatureResult::Unsupported
        } else {
            FeatureResult::Ready(result)
        }
    }

    // ---- replication ------------------------------------------------------

    pub async fn get_dr_status(&self) -> Option<DrStatusView> {
        let connection = self
            .poll(Purpose::DrStatus, vec![Self::statistics("DR")])
            .await?;
        let mut view = DrStatusView {
            status: connection.metadata_status("@Statistics_DR").unwrap_or_default(),
            hosts: HashMap::new(),
        };
        // The node table is the second table of the DR result.
        if let Some(tables) = connection.metadata_tables("@Statistics_DR") {
            if let Some(node_table) = tables.get(1) {
                extract::dr::extract_status(node_table, &mut view);
            }
        }
        Some(view)
    }

    pub async fn get_dr_details(&self) -> Option<DrDetails> {
        let connection = self
            .poll(Purpose::DrDetails, vec![Self::statistics("DR")])
            .await?;
        let mut details = DrDetails::default();
        if let Some(table) = connection.metadata_table("@Statistics_DR") {
            extract::dr::extract_details(&table, &mut details);
        }
        Some(details)
    }

    pub async fn get_dr_role(&self) -> Option<Vec<DrRoleEntry>> {
        let connection = self
            .poll(Purpose::DrRole, vec![Self::statistics("DRROLE")])
            .await?;
        let mut roles = Vec::new();
        if let Some(table) = connection.metadata_table("@Statistics_DRROLE") {
            extract::dr::extract_role(&table, &mut roles);
        }
        Some(roles)
    }

    pub async fn get_dr_consumer_state(&self) -> Option<HashMap<String, String>> {
        let connection = self
            .poll(Purpose::DrConsumer, vec![Self::statistics("DRCONSUMER")])
            .await?;
        let mut states = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_DRCONSUMER") {
            extract::dr::extract_consumer_state(&table, &mut states);
        }
        Some(states)
    }

    pub async fn get_dr_replication(&self) -> Option<DrReplicationGraph> {
        let connection = self
            .poll(Purpose::DrReplication, vec![Self::statistics("DRCONSUMER")])
            .await?;
        let mut graph = DrReplicationGraph::default();
        if let Some(table) = connection.metadata_table("@Statistics_DRCONSUMER") {
            let tables = connection.metadata_tables("@Statistics_DRCONSUMER");
            let coverage = tables.as_ref().and_then(|t| t.get(1));
            extract::dr::extract_replication(&table, coverage, &mut graph);
        }
        Some(graph)
    }

    /// Producer watermarks. Unlike the other aggregates this one carries
    /// state across polls so a backward-moving acked DR id is detectable.
    pub async fn get_dr_producer(&self) -> Option<DrProducerState> {
        let connection = self
            .poll(Purpose::DrProducer, vec![Self::statistics("DRPRODUCER")])
            .await?;
        let mut state = match self.dr_producer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(table) = connection.metadata_table("@Statistics_DRPRODUCER") {
            extract::dr::extract_producer(&table, &mut state);
        }
        Some(state.clone())
    }

    // ---- workload ---------------------------------------------------------

    pub async fn get_live_clients(&self) -> Option<LiveClientTotals> {
        let connection = self
            .poll(Purpose::LiveClients, vec![Self::statistics("LIVECLIENTS")])
            .await?;
        let mut totals = LiveClientTotals::default();
        if let Some(table) = connection.metadata_table("@Statistics_LIVECLIENTS") {
            extract::overview::extract_live_clients(&table, &mut totals);
        }
        Some(totals)
    }

    pub async fn get_importer_information(
        &self,
    ) -> Option<HashMap<String, ImporterStats>> {
        let connection = self
            .poll(Purpose::Importer, vec![Self::statistics("IMPORTER")])
            .await?;
        let mut importers = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_IMPORTER") {
            extract::overview::extract_importers(&table, &mut importers);
        }
        Some(importers)
    }

    pub async fn get_exporter_information(
        &self,
    ) -> Option<HashMap<String, ExporterStats>> {
        let connection = self
            .poll(Purpose::Exporter, vec![Self::statistics("EXPORT")])
            .await?;
        let mut exporters = HashMap::new();
        if let Some(table) = connection.metadata_table("@Statistics_EXPORT") {
            extract::tables::extract_exporters(&table, &mut exporters);
        }
        Some(exporters)
    }

    // ---- short API --------------------------------------------------------

    pub async fn get_deployment_json(&self) -> Option<Value> {
        self.short_api(Purpose::ShortApiDeployment, "deployment").await
    }

    pub async fn get_profile_json(&self) -> Option<Value> {
        self.short_api(Purpose::ShortApiProfile, "profile").await
    }

    pub async fn get_export_types(&self) -> Option<Value> {
        self.short_api(Purpose::ShortApiExportTypes, "deployment/export/type")
            .await
    }

    async fn short_api(&self, purpose: Purpose, path: &str) -> Option<Value> {
        let _gate = self.enter(purpose)?;
        let options = self.options_for(purpose).await;
        let connection = self.registry.get_or_create(options).await;
        let result = connection
            .call_execute(&CallKind::short_api(path, None))
            .await;
        if !result.is_success() {
            return Some(Value::Null);
        }
        Some(connection.metadata_json(&short_api_key(path)).unwrap_or(Value::Null))
    }

    /// POSTs an edited deployment configuration back to the cluster.
    pub async fn update_deployment(&self, body: Value) -> ResultSet {
        let options = self.options_for(Purpose::ShortApiDeployment).await;
        let connection = self.registry.get_or_create(options).await;
        connection
            .call_execute_update(&CallKind::short_api("deployment", Some(body)))
            .await
    }

    // ---- lifecycle --------------------------------------------------------

    pub async fn pause_cluster(&self) -> bool {
        self.lifecycle("@Pause").await
    }

    pub async fn resume_cluster(&self) -> bool {
        self.lifecycle("@Resume").await
    }

    pub async fn shutdown_cluster(&self) -> bool {
        self.lifecycle("@Shutdown").await
    }

    pub async fn promote_cluster(&self) -> bool {
        self.lifecycle("@Promote").await
    }

    pub async fn quiesce_cluster(&self) -> bool {
        self.lifecycle("@Quiesce").await
    }

    async fn lifecycle(&self, procedure: &str) -> bool {
        info!(procedure, "issuing cluster lifecycle call");
        let result = self
            .one_shot(
                Purpose::ClusterLifecycle,
                CallKind::procedure(procedure, vec![]),
            )
            .await;
        result.is_success()
    }

    pub async fn stop_node(&self, host_id: i64) -> ResultSet {
        self.one_shot(
            Purpose::StopNode,
            CallKind::procedure("@StopNode", vec![ParamValue::Int(host_id)]),
        )
        .await
    }

    // ---- session management -----------------------------------------------

    /// Probes reachability (and optionally the login) of an endpoint
    /// described by user-supplied settings.
    pub async fn test_connection(
        &self,
        settings: &SessionSettings,
        login_test: bool,
    ) -> AppResult<ResultSet> {
        settings
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let options = session_options(settings, Purpose::DatabaseLogin);
        Ok(self.registry.test_connection(options, login_test).await)
    }

    /// Applies a new credential pair to the session and every registered
    /// connection.
    pub async fn set_user_credentials(&self, settings: SessionSettings) -> AppResult<()> {
        settings
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        {
            let mut current = self.settings.write().await;
            current.user = settings.user.clone();
            current.password = settings.password.clone();
            current.is_hashed_password = settings.is_hashed_password;
        }
        self.registry
            .apply_credentials(
                settings.user,
                settings.password,
                settings.is_hashed_password,
            )
            .await;
        Ok(())
    }

    /// Points the session at a different server. Connections to the old
    /// server stay registered but idle; new polls key fresh connections.
    pub async fn change_server_configuration(
        &self,
        settings: SessionSettings,
    ) -> AppResult<()> {
        settings
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        info!(server = %settings.server, port = settings.port, "switching session endpoint");
        *self.settings.write().await = settings;
        Ok(())
    }
}

fn session_options(settings: &SessionSettings, purpose: Purpose) -> ConnectionOptions {
    ConnectionOptions {
        server: settings.server.clone(),
        port: settings.port,
        admin: settings.admin,
        user: settings.user.clone(),
        password: settings.password.clone(),
        is_hashed_password: settings.is_hashed_password,
        purpose,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn renderer() -> Renderer {
        Renderer::new(&AppConfig::default())
    }

    #[tokio::test]
    async fn refresh_gate_rejects_overlapping_polls() {
        let r = renderer();
        let first = r.enter(Purpose::GraphMemory);
        assert!(first.is_some());
        assert!(r.enter(Purpose::GraphMemory).is_none());
        // Independent purposes are unaffected.
        assert!(r.enter(Purpose::GraphCpu).is_some());

        drop(first);
        assert!(r.enter(Purpose::GraphMemory).is_some());
    }

    #[tokio::test]
    async fn auth_rejection_reports_permission_denied() {
        let r = renderer();
        let options = r.options_for(Purpose::SystemInformation).await;
        let connection = r.registry.get_or_create(options).await;
        connection.store_result(
            "@SystemInformation",
            Some("OVERVIEW"),
            &ResultSet {
                status: STATUS_AUTH_REJECTED,
                statusstring: "permission denied".into(),
                results: Vec::new(),
            },
        );

        match Renderer::system_info_view(&connection) {
            SystemInfoView::PermissionDenied => {}
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn populated_overview_reports_hosts() {
        let r = renderer();
        let options = r.options_for(Purpose::SystemInformation).await;
        let connection = r.registry.get_or_create(options).await;
        let rs: ResultSet = serde_json::from_value(json!({
            "status": 1,
            "results": [{
                "schema": [
                    {"name": "HOST_ID", "type": 5},
                    {"name": "KEY", "type": 9},
                    {"name": "VALUE", "type": 9}
                ],
                "data": [[0, "HOSTNAME", "h1"], [0, "CLUSTERSTATE", "RUNNING"]]
            }]
        }))
        .unwrap();
        connection.store_result("@SystemInformation", Some("OVERVIEW"), &rs);

        match Renderer::system_info_view(&connection) {
            SystemInfoView::Available { hosts, .. } => {
                assert_eq!(hosts[&0].hostname, "h1");
                assert_eq!(hosts[&0].cluster_state, "RUNNING");
            }
            SystemInfoView::PermissionDenied => panic!("unexpected permission denial"),
        }
    }

    #[tokio::test]
    async fn unsupported_snapshot_scan_is_not_a_failure() {
        let r = renderer();
        let options = r.options_for(Purpose::SnapshotScan).await;
        let connection = r.registry.get_or_create(options).await;
        connection.store_result(
            "@SnapshotScan",
            Some("/tmp/snapshots"),
            &ResultSet {
                status: STATUS_UNSUPPORTED,
                statusstring: "not supported in this edition".into(),
                results: Vec::new(),
            },
        );

        match Renderer::snapshot_scan_view(&connection, "/tmp/snapshots") {
            FeatureResult::Unsupported => {}
            FeatureResult::Ready(_) => panic!("expected Unsupported"),
        }
    }
}
