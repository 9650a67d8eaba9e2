//! IDR Rates Server Binary
//!
//! Loads the rate snapshots in the background and serves them over HTTP.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idr_rates_fx::{
    DataInitializer, FrankfurterClient, LatestRatesSource, SnapshotStore,
    SupportedCurrenciesSource,
};
use idr_rates_server::{router, AppState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "idr-rates")]
#[command(about = "IDR exchange-rate snapshot service")]
struct Args {
    /// Listen address (overrides IDR_RATES_LISTEN_ADDR)
    #[arg(long)]
    listen_addr: Option<String>,

    /// Listen port (overrides IDR_RATES_LISTEN_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Startup load deadline in seconds (overrides INIT_DEADLINE_SECS)
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Rate provider base URL (overrides FRANKFURTER_BASE_URL)
    #[arg(long)]
    provider_url: Option<String>,
}

impl Args {
    fn apply(self, config: &mut ServiceConfig) {
        if let Some(addr) = self.listen_addr {
            config.listen_addr = addr;
        }
        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(secs) = self.deadline_secs {
            config.initializer.deadline = Duration::from_secs(secs);
        }
        if let Some(url) = self.provider_url {
            config.provider.base_url = url;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServiceConfig::from_env();
    args.apply(&mut config);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting IDR Rates server");

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(anyhow::anyhow!("Configuration error: {}", e));
    }
    let addr = config.socket_addr().map_err(anyhow::Error::msg)?;

    if config.github_username.is_empty() {
        warn!("GITHUB_USERNAME not set, USD buy spread factor will be zero");
    }

    let store = Arc::new(SnapshotStore::new());
    let client = Arc::new(FrankfurterClient::new(&config.provider)?);

    let initializer = DataInitializer::new(
        store.clone(),
        Arc::new(LatestRatesSource::new(client.clone(), &config.github_username)),
        Arc::new(SupportedCurrenciesSource::new(client.clone())),
        config.initializer.clone(),
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        listen_addr = %config.listen_addr,
        listen_port = %config.listen_port,
        provider = %config.provider.base_url,
        "Listening"
    );

    tokio::spawn(async move {
        let disposition = initializer.initialize().await;
        if disposition.is_degraded() {
            warn!(?disposition, "Serving in degraded mode");
        } else {
            info!(?disposition, "Startup data loaded");
        }
    });

    let app = router(AppState::new(store, client));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
