//! Headless cluster monitor.
//!
//! Polls the configured cluster endpoint on an interval and logs the
//! aggregates a console front end would render.

use common::config::AppConfig;
use common::models::metrics::SystemInfoView;
use renderer::Renderer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "console-monitor";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load_with_service(SERVICE_NAME);
    info!(
        service = SERVICE_NAME,
        server = %config.default_server,
        port = config.default_port,
        "starting monitor loop"
    );

    let renderer = Renderer::new(&config);
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
        config.poll_interval_secs.max(1),
    ));

    loop {
        ticker.tick().await;
        poll_once(&renderer).await;
    }
}

async fn poll_once(renderer: &Renderer) {
    match renderer.get_system_information().await {
        Some(SystemInfoView::Available { hosts, .. }) => {
            info!(hosts = hosts.len(), "system overview refreshed");
        }
        Some(SystemInfoView::PermissionDenied) => {
            warn!("system overview rejected, check credentials");
        }
        None => {}
    }

    if let Some(memory) = renderer.get_memory_information().await {
        for usage in memory.values() {
            info!(
                host = %usage.hostname,
                memory_pct = usage.memory_usage,
                rss = usage.rss,
                "memory sample"
            );
        }
    }

    if let Some(cpu) = renderer.get_cpu_information().await {
        for usage in cpu.values() {
            info!(host = %usage.hostname, cpu_pct = usage.percent_used, "cpu sample");
        }
    }

    if let Some(latency) = renderer.get_latency_information().await {
        info!(cluster_p99_ms = latency.cluster_p99_ms, "latency sample");
    }

    if let Some(stats) = renderer.get_table_information().await {
        info!(tables = stats.len(), "table statistics refreshed");
    }

    if let Some(profile) = renderer.get_procedure_profile().await {
        info!(procedures = profile.len(), "procedure profile refreshed");
    }

    if let Some(status) = renderer.get_dr_status().await {
        info!(
            status = status.status,
            hosts = status.hosts.len(),
            "dr status refreshed"
        );
    }
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if env_path.exists() {
        if let Ok(content) = std::fs::read_to_string(env_path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim();
                    // Only set if not already set by the environment
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
        }
    }
}
