use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use social_api::config::AppConfig;
use social_api::database::DatabaseManager;
use social_api::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "social-api")]
#[command(about = "User registration, login and token-protected routes")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides SOCIAL_API_PORT / PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Address to bind (overrides API_HOST)")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }
    tracing::info!("Starting Social API in {:?} mode", config.environment);
    if config.uses_development_secret() {
        tracing::warn!("JWT_SECRET not set, signing tokens with the development key");
    }

    let store = DatabaseManager::open_store(&config.database)
        .await
        .context("failed to open credential store")?;

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let state = AppState::new(config, store)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Social API listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
