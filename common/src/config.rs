//! Application configuration.
//!
//! Loaded from environment variables with sensible defaults, the same way
//! each service binary configures itself.

/// Runtime configuration for the console core.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the component using this configuration (for log fields).
    pub service: String,
    /// Default cluster host to poll.
    pub default_server: String,
    /// Default HTTP port of the administrative endpoint.
    pub default_port: u16,
    /// Whether calls are issued against the admin interface by default.
    pub admin: bool,
    /// Per-call deadline in milliseconds.
    pub call_timeout_ms: u64,
    /// Deadline for the known long-running procedures
    /// (`@SnapshotRestore`, `@AdHoc`).
    pub long_call_timeout_ms: u64,
    /// Deadline for a plain connection probe.
    pub probe_timeout_ms: u64,
    /// Deadline for a login-test probe.
    pub login_probe_timeout_ms: u64,
    /// Poll interval for the monitor loop, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: "console".into(),
            default_server: "localhost".into(),
            default_port: 8080,
            admin: true,
            call_timeout_ms: 20_000,
            long_call_timeout_ms: 6_000_000,
            probe_timeout_ms: 5_000,
            login_probe_timeout_ms: 10_000,
            poll_interval_secs: 5,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment for a named component.
    ///
    /// Recognized variables: `CONSOLE_SERVER`, `CONSOLE_PORT`,
    /// `CONSOLE_ADMIN`, `CONSOLE_CALL_TIMEOUT_MS`,
    /// `CONSOLE_POLL_INTERVAL_SECS`. Unset or unparsable values fall back to
    /// the defaults.
    pub fn load_with_service(service: &str) -> Self {
        let mut config = Self {
            service: service.to_string(),
            ..Self::default()
        };

        if let Ok(server) = std::env::var("CONSOLE_SERVER") {
            if !server.trim().is_empty() {
                config.default_server = server.trim().to_string();
            }
        }
        if let Some(port) = env_parse::<u16>("CONSOLE_PORT") {
            config.default_port = port;
        }
        if let Ok(admin) = std::env::var("CONSOLE_ADMIN") {
            config.admin = admin == "true" || admin == "1";
        }
        if let Some(timeout) = env_parse::<u64>("CONSOLE_CALL_TIMEOUT_MS") {
            config.call_timeout_ms = timeout;
        }
        if let Some(interval) = env_parse::<u64>("CONSOLE_POLL_INTERVAL_SECS") {
            config.poll_interval_secs = interval;
        }

        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_endpoint_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.default_server, "localhost");
        assert_eq!(config.default_port, 8080);
        assert_eq!(config.call_timeout_ms, 20_000);
        assert_eq!(config.long_call_timeout_ms, 6_000_000);
    }
}
