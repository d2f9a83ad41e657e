//! Sendwatch Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - SENDWATCH_HOST: Bind address (default: 0.0.0.0)
//! - SENDWATCH_PORT: Port number (default: 8080)
//! - SENDWATCH_PROVIDER_KEY: Email provider API key (checks are disabled without it)
//! - SENDWATCH_PROVIDER_URL: Email provider API base URL
//! - SENDWATCH_SLACK_URL: Alert webhook URL (failing verdicts are only logged without it)
//! - SENDWATCH_TIMEOUT_MINUTES: Default grace window in minutes (default: 10)
//! - RUST_LOG: Log level (default: info)

use sendwatch::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sendwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse configuration from environment
    let host = std::env::var("SENDWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("SENDWATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let provider_key = std::env::var("SENDWATCH_PROVIDER_KEY")
        .ok()
        .filter(|v| !v.is_empty());
    let provider_url = std::env::var("SENDWATCH_PROVIDER_URL")
        .ok()
        .filter(|v| !v.is_empty());
    let slack_url = std::env::var("SENDWATCH_SLACK_URL")
        .ok()
        .filter(|v| !v.is_empty());
    let timeout_minutes: i64 = std::env::var("SENDWATCH_TIMEOUT_MINUTES")
        .ok()
        .and_then(|m| m.parse().ok())
        .unwrap_or(10);

    let config = ServerConfig {
        host,
        port,
        provider_key,
        provider_url,
        slack_url,
        timeout_minutes,
    };

    tracing::info!("Sendwatch configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    tracing::info!("  Grace window: {} minutes", config.timeout_minutes);
    tracing::info!(
        "  Provider configured: {}",
        config.provider_key.is_some() && config.provider_url.is_some()
    );
    tracing::info!(
        "  Alert webhook configured: {}",
        config.slack_url.is_some()
    );

    println!(
        "sendwatch {} - outbound email delivery watchdog",
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
