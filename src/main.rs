//! Hookrelay - GitHub to Discord webhook relay
//!
//! Receives GitHub webhook deliveries and posts a formatted summary of each
//! event into the Discord thread configured for its repository.

mod common;
mod config;
mod discord;
mod relay;
mod server;

#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};

use config::{env::check_empty_env_vars, env::get_config_path, load_and_validate};
use discord::DiscordWebhookClient;
use relay::{DedupCache, EventFormatter, Relay, RepoRouter};
use server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Hookrelay v{} starting...", env!("CARGO_PKG_VERSION"));

    for var in check_empty_env_vars() {
        warn!("Environment variable {} is set but empty", var);
    }

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!(
            "Set DISCORD_WEBHOOK_URL and the thread variables, or provide {}.",
            config_path
        );
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Port: {}", config.server.port);
    info!("  Discord webhook: set");
    info!(
        "  Signature verification: {}",
        if config.server.webhook_secret.is_some() { "enabled" } else { "disabled" }
    );
    info!("  Dedup capacity: {}", config.relay.dedup_capacity);

    let router = RepoRouter::from_config(&config.routing);
    for (repo, thread) in router.routes() {
        info!("  Route: {} -> thread {}", repo, thread);
    }
    info!(
        "  Default: {} -> thread {}",
        router.default_repository(),
        router.default_destination()
    );

    let client = DiscordWebhookClient::new(
        &config.discord.webhook_url,
        Duration::from_secs(config.discord.timeout_secs),
    )
    .context("Failed to create Discord webhook client")?;

    let relay = Relay::new(
        router,
        EventFormatter::new(config.relay.default_org.clone()),
        Arc::new(DedupCache::new(config.relay.dedup_capacity)),
        Arc::new(client),
    );

    let app = build_router(AppState::new(relay, config.server.webhook_secret.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on port {}", config.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
