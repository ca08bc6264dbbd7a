use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use livetranslate_gateway::{ServerConfig, routes, shutdown, state::AppState};

/// LiveTranslate Gateway - browser transcription relay and translation API
#[derive(Parser, Debug)]
#[command(name = "livetranslate-gateway")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Must be installed before any TLS connection is attempted
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    // Load configuration from file or environment
    let config = if let Some(config_path) = cli.config {
        info!("Loading configuration from {}", config_path.display());
        ServerConfig::from_file(&config_path)?
    } else {
        ServerConfig::from_env()?
    };

    for key in config.missing_api_keys() {
        warn!("{} is not set; requests to that provider will be rejected", key);
    }

    let address = config.address();
    let socket_addr: SocketAddr = address
        .parse()
        .map_err(|e| anyhow!("Invalid server address '{}': {}", address, e))?;
    let shutdown_timeout = config.shutdown_timeout();

    let app_state = AppState::new(config)?;
    let app = routes::create_app(app_state.clone());

    let listener = TcpListener::bind(&socket_addr).await?;
    info!("Server listening on http://{}", socket_addr);

    let coordinator = app_state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown::wait_for_signal().await;
            coordinator.trigger();
        })
        .await?;

    // WebSocket sessions outlive the HTTP server's graceful shutdown
    if app_state.shutdown.drain(shutdown_timeout).await {
        info!("All sessions closed");
    }

    Ok(())
}
