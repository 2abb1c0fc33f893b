//! One logical session to one cluster node.
//!
//! A `Connection` owns its credential pair, the cached `Authorization`
//! header, the procedure signature table, and a metadata map holding the
//! decoded result of every call made on the connection's behalf. Transport
//! and encoding failures never surface as `Err`: callers always receive a
//! result set, synthetic `status:-1` if need be.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::{debug, warn};

use common::errors::{AppError, AppResult};
use common::models::connection::ConnectionOptions;
use common::response::{MetadataEntry, ResultSet, ResultTable, STATUS_SUCCESS};

use crate::auth::build_authorization;
use crate::codec::{self, ParamValue, SignatureTable};
use crate::timeout::{is_long_running, with_call_timeout};

/// The administrative procedure-call endpoint path.
const API_PATH: &str = "api/1.0";

/// What to dispatch: a declared procedure call, or a REST-style "short API"
/// request that bypasses parameter encoding.
#[derive(Debug, Clone)]
pub enum CallKind {
    Procedure {
        name: String,
        params: Vec<ParamValue>,
    },
    ShortApi {
        path: String,
        body: Option<Value>,
    },
}

impl CallKind {
    pub fn procedure(name: impl Into<String>, params: Vec<ParamValue>) -> Self {
        CallKind::Procedure {
            name: name.into(),
            params,
        }
    }

    pub fn short_api(path: impl Into<String>, body: Option<Value>) -> Self {
        CallKind::ShortApi {
            path: path.into(),
            body,
        }
    }

    /// Whether this call gets the extended deadline.
    pub fn is_long_running(&self) -> bool {
        match self {
            CallKind::Procedure { name, .. } => is_long_running(name),
            CallKind::ShortApi { .. } => false,
        }
    }
}

pub struct Connection {
    options: RwLock<ConnectionOptions>,
    authorization: RwLock<Option<String>>,
    client: reqwest::Client,
    signatures: SignatureTable,
    metadata: RwLock<HashMap<String, MetadataEntry>>,
    ready: AtomicBool,
    /// Identity of the responding host, pinned once per registry from the
    /// first `Host` response header observed.
    pinned_host: Arc<OnceLock<String>>,
}

impl Connection {
    pub fn new(options: ConnectionOptions, pinned_host: Arc<OnceLock<String>>) -> Self {
        let authorization = Self::authorization_for(&options);
        Self {
            options: RwLock::new(options),
            authorization: RwLock::new(authorization),
            client: reqwest::Client::new(),
            signatures: codec::default_signatures(),
            metadata: RwLock::new(HashMap::new()),
            ready: AtomicBool::new(false),
            pinned_host,
        }
    }

    fn authorization_for(options: &ConnectionOptions) -> Option<String> {
        let (hashed, plain) = if options.is_hashed_password {
            (options.password.as_deref(), None)
        } else {
            (None, options.password.as_deref())
        };
        build_authorization(options.user.as_deref(), hashed, plain)
    }

    pub fn options(&self) -> ConnectionOptions {
        read_lock(&self.options).clone()
    }

    pub fn cache_key(&self) -> String {
        read_lock(&self.options).cache_key()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Overwrites the connection's identity in place and recomputes the
    /// cached authorization header. The metadata map survives; the next poll
    /// replaces its entries.
    pub fn reconfigure(&self, options: ConnectionOptions) {
        *write_lock(&self.authorization) = Self::authorization_for(&options);
        *write_lock(&self.options) = options;
        self.ready.store(false, Ordering::Release);
    }

    fn authorization(&self) -> Option<String> {
        read_lock(&self.authorization).clone()
    }

    /// Host identity pinned from the first observed `Host` response header.
    pub fn pinned_host(&self) -> Option<&str> {
        self.pinned_host.get().map(String::as_str)
    }

    /// Dispatches a call as a GET, wrapped in the per-call deadline. Never
    /// fails; every error becomes a synthetic `status:-1` result set.
    pub async fn call_execute(&self, kind: &CallKind) -> ResultSet {
        self.call(kind, false).await
    }

    /// Dispatches a call as a POST (update variant).
    pub async fn call_execute_update(&self, kind: &CallKind) -> ResultSet {
        self.call(kind, true).await
    }

    async fn call(&self, kind: &CallKind, update: bool) -> ResultSet {
        let dispatch = async {
            match self.dispatch(kind, update).await {
                Ok(result) => result,
                Err(err) => {
                    warn!(
                        connection = %self.options().display(),
                        error = %err,
                        "call failed, synthesizing error result"
                    );
                    ResultSet::error(err.to_string())
                }
            }
        };
        with_call_timeout(dispatch, kind.is_long_running()).await
    }

    async fn dispatch(&self, kind: &CallKind, update: bool) -> AppResult<ResultSet> {
        match kind {
            CallKind::Procedure { name, params } => {
                self.dispatch_procedure(name, params, update).await
            }
            CallKind::ShortApi { path, body } => {
                self.dispatch_short_api(path, body.as_ref(), update).await
            }
        }
    }

    async fn dispatch_procedure(
        &self,
        name: &str,
        params: &[ParamValue],
        update: bool,
    ) -> AppResult<ResultSet> {
        let options = self.options();
        let pairs = if codec::is_lifecycle(name) && params.is_empty() {
            codec::encode_lifecycle(name, options.admin)
        } else {
            codec::encode(&self.signatures, name, params, options.admin)?
        };
        let url = format!(
            "http://{}:{}/{API_PATH}/",
            options.server.trim(),
            options.port
        );

        debug!(procedure = name, url = %url, update, "dispatching procedure call");
        let request = if update {
            self.client.post(&url).form(&pairs)
        } else {
            self.client.get(&url).query(&pairs)
        };
        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        self.pin_host(&response);

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("HTTP {status}")));
        }
        response
            .json::<ResultSet>()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Short API calls return a plain JSON object, not the columnar result
    /// shape. The object is stored in the metadata map under the path-derived
    /// key and the caller gets a synthetic success envelope.
    async fn dispatch_short_api(
        &self,
        path: &str,
        body: Option<&Value>,
        update: bool,
    ) -> AppResult<ResultSet> {
        if path.trim().is_empty() {
            return Err(AppError::MissingApiPath);
        }
        let options = self.options();
        let url = format!(
            "http://{}:{}/{}/",
            options.server.trim(),
            options.port,
            path.trim_matches('/')
        );

        debug!(path, url = %url, update, "dispatching short API call");
        let request = if update {
            let body = body.ok_or(AppError::MissingApiBody)?;
            let mut req = self.client.post(&url).json(body);
            if options.admin {
                req = req.query(&[("admin", "true")]);
            }
            req
        } else {
            self.client.get(&url)
        };
        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        self.pin_host(&response);

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Transport(format!("HTTP {status}")));
        }
        let json = response
            .json::<Value>()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        self.set_metadata(short_api_key(path), MetadataEntry::Json(json));
        Ok(ResultSet {
            status: STATUS_SUCCESS,
            statusstring: String::new(),
            results: Vec::new(),
        })
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.authorization() {
            Some(header) => request.header(AUTHORIZATION, header),
            None => request,
        }
    }

    fn pin_host(&self, response: &reqwest::Response) {
        if let Some(host) = response
            .headers()
            .get("Host")
            .and_then(|v| v.to_str().ok())
        {
            let _ = self.pinned_host.set(host.to_string());
        }
    }

    /// Records a procedure result under the uniform key scheme:
    /// `{procedure}_{first-parameter}` (or just the procedure name), with
    /// `_status` / `_statusstring` companions and, for multi-table results,
    /// a `_completeData` entry holding every table.
    pub fn store_result(&self, procedure: &str, first_param: Option<&str>, result: &ResultSet) {
        let base = match first_param {
            Some(param) => format!("{procedure}_{param}"),
            None => procedure.to_string(),
        };
        let mut metadata = write_lock(&self.metadata);
        metadata.insert(
            base.clone(),
            MetadataEntry::Table(result.results.first().cloned().unwrap_or_default()),
        );
        if result.results.len() > 1 {
            metadata.insert(
                format!("{base}_completeData"),
                MetadataEntry::Tables(result.results.clone()),
            );
        }
        metadata.insert(format!("{base}_status"), MetadataEntry::Status(result.status));
        metadata.insert(
            format!("{base}_statusstring"),
            MetadataEntry::Text(result.statusstring.clone()),
        );
    }

    pub fn set_metadata(&self, key: String, entry: MetadataEntry) {
        write_lock(&self.metadata).insert(key, entry);
    }

    pub fn metadata_table(&self, key: &str) -> Option<ResultTable> {
        match self.read_metadata(key)? {
            MetadataEntry::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn metadata_tables(&self, key: &str) -> Option<Vec<ResultTable>> {
        match self.read_metadata(&format!("{key}_completeData"))? {
            MetadataEntry::Tables(tables) => Some(tables),
            _ => None,
        }
    }

    pub fn metadata_status(&self, key: &str) -> Option<i32> {
        match self.read_metadata(&format!("{key}_status"))? {
            MetadataEntry::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn metadata_json(&self, key: &str) -> Option<Value> {
        match self.read_metadata(key)? {
            MetadataEntry::Json(value) => Some(value),
            _ => None,
        }
    }

    fn read_metadata(&self, key: &str) -> Option<MetadataEntry> {
        read_lock(&self.metadata).get(key).cloned()
    }
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Metadata key for a short API path: `deployment/users` -> `SHORTAPI_DEPLOYMENT_USERS`.
pub fn short_api_key(path: &str) -> String {
    let upper = path
        .trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect::<String>();
    format!("SHORTAPI_{upper}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::connection::Purpose;
    use serde_json::json;

    fn test_connection() -> Connection {
        let options = ConnectionOptions::new("localhost", 8080, true, Purpose::GraphMemory)
            .with_credentials("admin", "pw", false);
        Connection::new(options, Arc::new(OnceLock::new()))
    }

    #[test]
    fn stores_result_under_uniform_keys() {
        let connection = test_connection();
        let rs: ResultSet = serde_json::from_value(json!({
            "status": 1,
            "statusstring": "",
            "results": [
                {"schema": [{"name": "HOSTNAME", "type": 9}], "data": [["h1"]]},
                {"schema": [{"name": "EXTRA", "type": 9}], "data": [["x"]]}
            ]
        }))
        .unwrap();

        connection.store_result("@Statistics", Some("MEMORY"), &rs);

        let table = connection.metadata_table("@Statistics_MEMORY").unwrap();
        assert_eq!(table.schema[0].name, "HOSTNAME");
        assert_eq!(connection.metadata_status("@Statistics_MEMORY"), Some(1));
        assert_eq!(
            connection.metadata_tables("@Statistics_MEMORY").unwrap().len(),
            2
        );
    }

    #[test]
    fn single_table_results_have_no_complete_data_entry() {
        let connection = test_connection();
        let rs: ResultSet = serde_json::from_value(json!({
            "status": 1,
            "results": [{"schema": [], "data": []}]
        }))
        .unwrap();
        connection.store_result("@SnapshotStatus", None, &rs);
        assert!(connection.metadata_table("@SnapshotStatus").is_some());
        assert!(connection.metadata_tables("@SnapshotStatus").is_none());
    }

    #[test]
    fn reconfigure_recomputes_authorization_and_resets_ready() {
        let connection = test_connection();
        connection.mark_ready();
        let before = connection.authorization();

        let options = ConnectionOptions::new("localhost", 8080, true, Purpose::GraphMemory)
            .with_credentials("admin", "precomputed-hash", true);
        connection.reconfigure(options);

        assert_ne!(connection.authorization(), before);
        assert_eq!(
            connection.authorization().as_deref(),
            Some("Hashed admin:precomputed-hash")
        );
        assert!(!connection.is_ready());
    }

    #[test]
    fn short_api_keys_are_path_derived() {
        assert_eq!(short_api_key("deployment"), "SHORTAPI_DEPLOYMENT");
        assert_eq!(short_api_key("/deployment/users/"), "SHORTAPI_DEPLOYMENT_USERS");
        assert_eq!(short_api_key("deployment/export/type"), "SHORTAPI_DEPLOYMENT_EXPORT_TYPE");
    }
}
