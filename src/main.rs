//! Location Relay Server
//!
//! Serves the capture page and relays consented location shares by email.
//!
//! Usage:
//!   cargo run --bin location_relay
//!
//! Environment:
//!   HOST / PORT     - Listener (default: 0.0.0.0:5000)
//!   EMAIL_TRANSPORT - smtp | api (default: smtp)
//!   RUST_LOG        - Log filter (default: info)
//!   See models::config for the full list.

use location_relay::{create_router, AppConfig, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Read once; immutable from here on
    let config = AppConfig::from_env()?;
    config.log_summary();

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = Arc::new(AppState::new(config)?);
    let app = create_router(state);

    info!("🚀 Location relay listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET     /            - Capture page");
    info!("  POST    /send-email  - Share location (consent required)");
    info!("  OPTIONS /send-email  - CORS preflight");
    info!("  GET     /health      - Masked configuration snapshot");
    if !addr.ip().is_loopback() {
        warn!("Browsers only expose geolocation over HTTPS; put a TLS proxy in front in production");
    }

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Location relay shut down");
    Ok(())
}
