//! Map viewer service.
//!
//! Serves the catalog viewer page and the JSON API behind it.

use anyhow::{Context, Result};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use map_viewer::config::ViewerConfig;
use map_viewer::fetcher::{CapabilitiesSource, FileCapabilities, HttpCapabilitiesFetcher};
use map_viewer::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "map-viewer")]
#[command(about = "WMS catalog map viewer")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "VIEWER_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, env = "VIEWER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// YAML configuration file
    #[arg(short, long, env = "VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Read the capabilities document from a file instead of the server
    #[arg(long, env = "VIEWER_CAPABILITIES_FILE")]
    capabilities_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    let config = ViewerConfig::load(args.config.as_deref())?;
    info!(
        capabilities_url = %config.capabilities_url,
        wms = %config.wms_base_url,
        wfs = %config.wfs_base_url,
        "Starting map viewer"
    );

    let source: Box<dyn CapabilitiesSource> = match args.capabilities_file {
        Some(path) => Box::new(FileCapabilities::new(path)),
        None => Box::new(HttpCapabilitiesFetcher::new(
            config.capabilities_url.clone(),
            config.fetch_timeout(),
        )?),
    };

    let state = Arc::new(AppState::new(config, Some(prometheus_handle)));

    // The page is served with a spinner until the catalog arrives.
    let loader = state.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.load_menu(source.as_ref()).await {
            error!(kind = e.kind(), error = %e, "Menu unavailable");
        }
    });

    let app = map_viewer::router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
