//! Connection identity and session settings.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Logical role of a connection. The same physical endpoint may be reached
/// through several connections, one per purpose, so that their metadata maps
/// never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Purpose {
    DatabaseLogin,
    SystemInformation,
    ClusterInformation,
    Deployment,
    GraphMemory,
    GraphCpu,
    GraphLatency,
    PartitionIdleTime,
    TableInformation,
    SchemaCatalog,
    ProcedureProfile,
    ProcedureDetail,
    CommandLog,
    SnapshotStatus,
    SnapshotScan,
    SnapshotSave,
    SnapshotRestore,
    SnapshotDelete,
    DrStatus,
    DrDetails,
    DrRole,
    DrConsumer,
    DrReplication,
    DrProducer,
    LiveClients,
    Importer,
    Exporter,
    ShortApiDeployment,
    ShortApiProfile,
    ShortApiExportTypes,
    ClusterLifecycle,
    StopNode,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::DatabaseLogin => "DATABASE_LOGIN",
            Purpose::SystemInformation => "SYSTEM_INFORMATION",
            Purpose::ClusterInformation => "CLUSTER_INFORMATION",
            Purpose::Deployment => "DEPLOYMENT_INFORMATION",
            Purpose::GraphMemory => "GRAPH_MEMORY",
            Purpose::GraphCpu => "GRAPH_CPU",
            Purpose::GraphLatency => "GRAPH_LATENCY",
            Purpose::PartitionIdleTime => "PARTITION_IDLE_TIME",
            Purpose::TableInformation => "TABLE_INFORMATION",
            Purpose::SchemaCatalog => "SCHEMA_CATALOG",
            Purpose::ProcedureProfile => "PROCEDURE_PROFILE",
            Purpose::ProcedureDetail => "PROCEDURE_DETAIL",
            Purpose::CommandLog => "COMMAND_LOG",
            Purpose::SnapshotStatus => "SNAPSHOT_STATUS",
            Purpose::SnapshotScan => "SNAPSHOT_SCAN",
            Purpose::SnapshotSave => "SNAPSHOT_SAVE",
            Purpose::SnapshotRestore => "SNAPSHOT_RESTORE",
            Purpose::SnapshotDelete => "SNAPSHOT_DELETE",
            Purpose::DrStatus => "DR_STATUS",
            Purpose::DrDetails => "DR_DETAILS",
            Purpose::DrRole => "DR_ROLE",
            Purpose::DrConsumer => "DR_CONSUMER",
            Purpose::DrReplication => "DR_REPLICATION",
            Purpose::DrProducer => "DR_PRODUCER",
            Purpose::LiveClients => "LIVE_CLIENTS",
            Purpose::Importer => "IMPORTER",
            Purpose::Exporter => "EXPORTER",
            Purpose::ShortApiDeployment => "SHORTAPI_DEPLOYMENT",
            Purpose::ShortApiProfile => "SHORTAPI_PROFILE",
            Purpose::ShortApiExportTypes => "SHORTAPI_EXPORT_TYPES",
            Purpose::ClusterLifecycle => "CLUSTER_LIFECYCLE",
            Purpose::StopNode => "STOP_NODE",
        }
    }
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to build (or rebuild) one connection.
///
/// At most one of `password` / `hashed_password` is meaningful at a time,
/// selected by `is_hashed_password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionOptions {
    pub server: String,
    pub port: u16,
    pub admin: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    pub is_hashed_password: bool,
    pub purpose: Purpose,
}

impl ConnectionOptions {
    pub fn new(server: impl Into<String>, port: u16, admin: bool, purpose: Purpose) -> Self {
        Self {
            server: server.into(),
            port,
            admin,
            user: None,
            password: None,
            is_hashed_password: false,
            purpose,
        }
    }

    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
        is_hashed_password: bool,
    ) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self.is_hashed_password = is_hashed_password;
        self
    }

    /// Registry key for this connection. Pure function of
    /// (server, port, user, admin, purpose); every character outside
    /// `[A-Za-z0-9_]` is replaced with `_` so the key is safe to use as a
    /// plain identifier.
    pub fn cache_key(&self) -> String {
        let user = self.user.as_deref().unwrap_or("").trim();
        let raw = format!(
            "{}_{}_{}_{}_{}",
            self.server.trim(),
            self.port,
            user,
            if self.admin { "Admin" } else { "" },
            self.purpose.as_str(),
        );
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }

    /// Human-readable identity for log lines.
    pub fn display(&self) -> String {
        match self.user.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(user) => format!("{}@{}:{}", user.trim(), self.server.trim(), self.port),
            None => format!("{}:{}", self.server.trim(), self.port),
        }
    }
}

/// User-supplied connection settings, validated before they reach the
/// registry.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct SessionSettings {
    #[validate(length(min = 1, message = "server must not be empty"))]
    pub server: String,
    #[validate(range(min = 1, message = "port must be non-zero"))]
    pub port: u16,
    pub admin: bool,
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_hashed_password: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_contains_only_identifier_chars() {
        let opts = ConnectionOptions::new("db-01.example.com", 8080, true, Purpose::GraphMemory)
            .with_credentials("admin user", "secret", false);
        let key = opts.cache_key();
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        assert!(key.contains("Admin"));
        assert!(key.contains("GRAPH_MEMORY"));
    }

    #[test]
    fn cache_key_ignores_incidental_whitespace() {
        let a = ConnectionOptions::new("  host1  ", 8080, false, Purpose::CommandLog)
            .with_credentials(" alice ", "pw", false);
        let b = ConnectionOptions::new("host1", 8080, false, Purpose::CommandLog)
            .with_credentials("alice", "other-pw", true);
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_distinguishes_purposes() {
        let a = ConnectionOptions::new("host1", 8080, true, Purpose::GraphMemory);
        let b = ConnectionOptions::new("host1", 8080, true, Purpose::GraphCpu);
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn validates_session_settings() {
        let bad = SessionSettings {
            server: "".into(),
            port: 8080,
            admin: true,
            user: None,
            password: None,
            is_hashed_password: false,
        };
        assert!(bad.validate().is_err());

        let good = SessionSettings {
            server: "localhost".into(),
            port: 8080,
            admin: true,
            user: Some("admin".into()),
            password: Some("pw".into()),
            is_hashed_password: false,
        };
        assert!(good.validate().is_ok());
    }
}
