//! WiFi AAA gateway accounting service
//!
//! Tracks authenticated client sessions from RADIUS accounting Start through
//! Stop, idle timeout or session manager termination, and keeps the flow
//! controller, session manager, directory and RADIUS tier consistent.

use std::net::SocketAddr;
use std::sync::Arc;

use aaa_core::AaaConfig;
use accounting::{AccountingService, Backends};
use anyhow::{Context, Result};
use backends::{BackendsConfig, HttpDirectory, HttpFlowController, HttpSessionManager, PeerRegistry};
use session_table::SessionTable;
use tokio::signal;
use tracing::{error, info};

use api::{router, AppState};
use telemetry::{init_tracing_from_env, TracingEventLogger};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default)]
    aaa: AaaConfig,

    #[serde(default)]
    backends: BackendsConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9109
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            aaa: AaaConfig::default(),
            backends: BackendsConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting AAA accounting service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    info!(
        accounting_enabled = config.aaa.accounting_enabled,
        create_session_on_auth = config.aaa.create_session_on_auth,
        idle_timeout_ms = config.aaa.idle_session_timeout().as_millis() as u64,
        "Loaded AAA config"
    );

    let backends = build_backends(&config.backends)?;
    let (service, timeout_rx) =
        AccountingService::with_timeout_queue(SessionTable::new(), config.aaa.clone(), backends);
    let _timeout_worker = service.clone().start_timeout_worker(timeout_rx);

    let app = router(AppState::new(service.clone()));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!(
        active_sessions = service.sessions().len(),
        "Shutdown complete"
    );
    Ok(())
}

/// Build the HTTP clients of the backend peers.
fn build_backends(config: &BackendsConfig) -> Result<Backends> {
    let timeout = config.request_timeout();

    let flows = HttpFlowController::new(&config.flow_controller_url, timeout)
        .context("Invalid flow controller URL")?;
    let session_manager = HttpSessionManager::new(&config.session_manager_url, timeout)
        .context("Invalid session manager URL")?;
    let directory =
        HttpDirectory::new(&config.directory_url, timeout).context("Invalid directory URL")?;

    if config.radius_url.is_none() {
        error!("No RADIUS peer configured, disconnect notifications will fail");
    }

    Ok(Backends {
        flows: Arc::new(flows),
        session_manager: Arc::new(session_manager),
        directory: Arc::new(directory),
        registry: Arc::new(PeerRegistry::from_config(config)),
        events: Arc::new(TracingEventLogger),
    })
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        .add_source(config::Config::try_from(&Config::default())?)
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("AAA")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Flat aliases for the peer addresses, as most deployments set them
    if let Ok(url) = std::env::var("AAA_RADIUS_URL") {
        config.backends.radius_url = Some(url);
    }
    if let Ok(url) = std::env::var("AAA_SESSION_MANAGER_URL") {
        config.backends.session_manager_url = url;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
