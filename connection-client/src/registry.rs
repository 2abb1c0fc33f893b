//! Keyed store of live connections.
//!
//! One registry per process (owned by the facade, never a global). Lookup is
//! by the normalized cache key, so two requests for the same
//! (server, port, user, admin, purpose) tuple share one connection.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::info;

use common::models::connection::ConnectionOptions;
use common::response::ResultSet;

use crate::codec::ParamValue;
use crate::connection::{CallKind, Connection};
use crate::queue::CallQueue;

/// Deadline for a plain reachability probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for a login-test probe.
pub const LOGIN_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A procedure command a connection runs at registration time to populate
/// its metadata map.
#[derive(Debug, Clone)]
pub struct ProcedureCommand {
    pub procedure: String,
    pub params: Vec<ParamValue>,
    /// Dispatch as a POST rather than a GET.
    pub update: bool,
}

impl ProcedureCommand {
    pub fn new(procedure: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            procedure: procedure.into(),
            params,
            update: false,
        }
    }

    pub fn update(mut self) -> Self {
        self.update = true;
        self
    }
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Arc<Connection>>>,
    /// Responding-host identity, shared with every connection and set once.
    pinned_host: Arc<OnceLock<String>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_connection(&self, options: &ConnectionOptions) -> bool {
        self.connections
            .read()
            .await
            .contains_key(&options.cache_key())
    }

    pub async fn get(&self, cache_key: &str) -> Option<Arc<Connection>> {
        self.connections.read().await.get(cache_key).cloned()
    }

    /// Returns the connection for the options' cache key, creating it if
    /// absent.
    pub async fn get_or_create(&self, options: ConnectionOptions) -> Arc<Connection> {
        let key = options.cache_key();
        if let Some(existing) = self.connections.read().await.get(&key) {
            return existing.clone();
        }

        let mut connections = self.connections.write().await;
        // A racing caller may have inserted while we upgraded the lock.
        if let Some(existing) = connections.get(&key) {
            return existing.clone();
        }
        info!(key = %key, endpoint = %options.display(), "registering connection");
        let connection = Arc::new(Connection::new(options, self.pinned_host.clone()));
        connections.insert(key, connection.clone());
        connection
    }

    /// Refreshes an existing connection in place (same cache key, new
    /// credentials), or registers it if absent.
    pub async fn update_connection(&self, options: ConnectionOptions) -> Arc<Connection> {
        let key = options.cache_key();
        if let Some(existing) = self.connections.read().await.get(&key) {
            info!(key = %key, "refreshing connection credentials");
            existing.reconfigure(options);
            return existing.clone();
        }
        self.get_or_create(options).await
    }

    /// Registers a connection and runs its configured procedure commands
    /// through a batch, storing each decoded result in the connection's
    /// metadata map. The connection is marked ready once the batch drains.
    /// Returns the connection and the batch's aggregate success flag.
    pub async fn register_with_commands(
        &self,
        options: ConnectionOptions,
        commands: Vec<ProcedureCommand>,
    ) -> (Arc<Connection>, bool) {
        let connection = self.get_or_create(options).await;

        let mut queue = CallQueue::new(connection.clone()).continue_on_failure();
        for command in commands {
            let first_param = command.params.first().map(ParamValue::token);
            let kind = CallKind::procedure(command.procedure.clone(), command.params);
            let sink = connection.clone();
            let procedure = command.procedure;
            let callback = move |result: &ResultSet| {
                sink.store_result(&procedure, first_param.as_deref(), result);
            };
            if command.update {
                queue.enqueue_update(kind, callback);
            } else {
                queue.enqueue(kind, callback);
            }
        }
        let success = queue.run().await;
        connection.mark_ready();
        (connection, success)
    }

    /// Applies a new credential set to every registered connection.
    /// Connections whose cache key changes (the key includes the user) are
    /// re-indexed under the new key.
    pub async fn apply_credentials(
        &self,
        user: Option<String>,
        password: Option<String>,
        is_hashed_password: bool,
    ) {
        let mut connections = self.connections.write().await;
        let mut rekeyed = Vec::new();
        for (key, connection) in connections.iter() {
            let mut options = connection.options();
            options.user = user.clone();
            options.password = password.clone();
            options.is_hashed_password = is_hashed_password;
            let new_key = options.cache_key();
            connection.reconfigure(options);
            if new_key != *key {
                rekeyed.push((key.clone(), new_key, connection.clone()));
            }
        }
        for (old_key, new_key, connection) in rekeyed {
            connections.remove(&old_key);
            connections.insert(new_key, connection);
        }
    }

    /// Reachability probe: `@Statistics TABLE 0` with a short deadline. A
    /// probe that never answers yields the synthetic `-100` result set; an
    /// answered probe yields whatever the server said (including `-3` for a
    /// rejected login).
    pub async fn test_connection(
        &self,
        options: ConnectionOptions,
        login_test: bool,
    ) -> ResultSet {
        let deadline = if login_test {
            LOGIN_PROBE_TIMEOUT
        } else {
            PROBE_TIMEOUT
        };
        let connection = Connection::new(options, self.pinned_host.clone());
        let kind = CallKind::procedure(
            "@Statistics",
            vec![ParamValue::from("TABLE"), ParamValue::Int(0)],
        );
        match tokio::time::timeout(deadline, connection.call_execute(&kind)).await {
            Ok(result) => result,
            Err(_) => ResultSet::unavailable(),
        }
    }

    /// Host identity pinned from the first response observed by any
    /// connection in this registry.
    pub fn pinned_host(&self) -> Option<&str> {
        self.pinned_host.get().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::connection::Purpose;
    use common::response::STATUS_UNAVAILABLE;

    fn options(purpose: Purpose) -> ConnectionOptions {
        ConnectionOptions::new("localhost", 8080, true, purpose)
            .with_credentials("admin", "pw", false)
    }

    #[tokio::test]
    async fn get_or_create_reuses_by_cache_key() {
        let registry = ConnectionRegistry::new();
        let a = registry.get_or_create(options(Purpose::GraphMemory)).await;
        let b = registry.get_or_create(options(Purpose::GraphMemory)).await;
        assert!(Arc::ptr_eq(&a, &b));

        let c = registry.get_or_create(options(Purpose::GraphCpu)).await;
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn update_connection_refreshes_in_place() {
        let registry = ConnectionRegistry::new();
        let original = registry.get_or_create(options(Purpose::CommandLog)).await;

        let refreshed = registry
            .update_connection(
                ConnectionOptions::new("localhost", 8080, true, Purpose::CommandLog)
                    .with_credentials("admin", "new-pw", false),
            )
            .await;

        assert!(Arc::ptr_eq(&original, &refreshed));
        assert!(!refreshed.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_probe_synthesizes_unavailable() {
        // Nothing listens on this port; under a paused clock the connect
        // attempt outlives the probe deadline.
        let registry = ConnectionRegistry::new();
        let opts = ConnectionOptions::new("192.0.2.1", 21212, false, Purpose::DatabaseLogin);
        let result = registry.test_connection(opts, false).await;
        assert!(result.status == STATUS_UNAVAILABLE || result.status == -1);
    }
}
