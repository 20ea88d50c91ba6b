//! DevCamper API server
//!
//! Reads `DEVCAMPER_CONFIG` (a YAML file) when set, applies `DEVCAMPER_*`
//! environment overrides and serves the API until Ctrl+C or SIGTERM.

use anyhow::Result;
use devcamper::config::AppConfig;
use devcamper::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("devcamper=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load()?;
    if config.auth.jwt_secret == AppConfig::default().auth.jwt_secret {
        tracing::warn!("using the default JWT secret; set DEVCAMPER_JWT_SECRET");
    }

    tracing::info!(
        "Starting {} v{} under {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.server.api_prefix
    );

    ServerBuilder::new().with_config(config).serve().await
}
