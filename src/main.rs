//! Chat Gateway - Main entry point
//!
//! This binary creates and runs the HTTP server with all configured routes
//! and middleware. Configuration is loaded from a YAML file with
//! environment overrides.

use anyhow::Result;
use chat_gateway::{build_router, AppState, GatewayConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before reading any environment variables)
    dotenvy::dotenv().ok();

    // Check if NO_COLOR environment variable is set (for file logging without ANSI codes)
    let no_color = std::env::var("NO_COLOR").is_ok();

    // Always suppress noisy HTTP library logs regardless of RUST_LOG setting
    let base_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,chat_gateway=debug".to_string());
    let filter_str = format!("{},hyper=warn,h2=warn,reqwest=warn", base_filter);
    let filter = tracing_subscriber::EnvFilter::new(filter_str);

    if no_color {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "gateway.yaml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        tracing::info!("Loading configuration from {}", config_path);
        GatewayConfig::load(&config_path)?
    } else {
        tracing::info!(
            "Config file {} not found; using defaults with env overrides",
            config_path
        );
        let mut config = GatewayConfig::default();
        config.apply_env_overrides();
        config
    };

    let http_client = create_http_client(&config);
    let state = Arc::new(AppState::from_config(config, http_client));
    state.log_binding_availability();

    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()?;

    tracing::info!("Starting chat gateway on {}", addr);
    tracing::info!("AI chat: POST /api/chat (model {})", state.config.model);
    tracing::info!("Social chat: /api/rooms/*, /api/dm/*");
    tracing::info!(
        "Proxied prefixes: {}",
        state
            .config
            .routes
            .iter()
            .map(|r| r.prefix.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create HTTP client with connection pooling
fn create_http_client(config: &GatewayConfig) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
        .pool_max_idle_per_host(100)
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .build()
        .expect("Failed to build HTTP client")
}
