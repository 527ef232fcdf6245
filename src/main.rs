//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: configuration, messages, responses, conversation state
//! - Application: registry, router, renderer, conversation runtime, logging
//! - Infrastructure: Telegram adapter, state store, webhook server
//! - Interface: command handlers

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chatflow::application::router::CommandRouter;
use chatflow::application::runtime::RuntimeManager;
use chatflow::domain::config::AppConfig;
use chatflow::infrastructure::server::{AppState, create_router};
use chatflow::infrastructure::store::FileStateStore;
use chatflow::infrastructure::telegram::TelegramService;
use chatflow::{application, interface};

#[derive(Debug, Parser)]
#[command(name = "chatflow", about = "Conversational command bot for Telegram")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&args.config)?;
    if !config.server.webhook_path.starts_with('/') {
        bail!("server.webhook_path must start with '/'");
    }

    // 2. Logging Setup
    let _guard = application::logging::init(&config.system.data_dir)?;
    tracing::info!("Starting chatflow...");

    // 3. Infrastructure
    let telegram = TelegramService::new(config.services.telegram.resolve()?)
        .context("Failed to build Telegram client")?;
    let store = FileStateStore::open(config.system.data_dir.join("conversations"))
        .await
        .context("Failed to open conversation store")?;

    // 4. Engine
    let registry = interface::commands::default_registry(&config.commands);
    tracing::info!("Registered {} commands", registry.len());
    let router = CommandRouter::new(Arc::new(registry))
        .with_trusted_aliases(config.system.trusted_aliases.iter().cloned());

    let runtime = RuntimeManager::new(Arc::new(router), Arc::new(telegram), Arc::new(store))
        .with_mailbox_capacity(config.system.mailbox_capacity)
        .with_idle_timeout(Duration::from_secs(config.system.idle_timeout_secs));

    // 5. Webhook Server
    let app = create_router(
        AppState {
            runtime: Arc::new(runtime),
            secret_token: config.server.secret_token.clone(),
        },
        &config.server.webhook_path,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    tracing::info!(
        "Listening on {}{}",
        config.server.bind,
        config.server.webhook_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}
