//! Telebridge - game server <-> Telegram chat bridge
//!
//! Relays game events into a Telegram chat and lets chat members run
//! `/say` and `/online` against the game server.

mod bridge;
mod common;
mod config;
mod game;
mod telegram;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{error, info, warn};

use bridge::{
    InboundCommandRouter, JsonLinkRepository, LinkAdmin, NameResolver, OnlineCommand, SayCommand,
    ServiceRelay,
};
use config::{env::get_config_path, load_and_validate, ConfigHolder};
use game::{ConsoleGame, ConsoleSession};
use telegram::{HttpGateway, Poller};

/// Time allowed for queued sends to drain on shutdown.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Telebridge v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} is properly formatted.", config_path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Outbound: {}", if config.has_outbound() { "on" } else { "off" });
    info!("  Chat: {}", config.telegram.chat_id);
    info!("  MarkdownV2: {}", config.telegram.use_markdown_v2);
    info!(
        "  Inbound: {} (prefix '{}', poll {}s)",
        if config.inbound_enabled() { "on" } else { "off" },
        config.command_prefix(),
        config.telegram.inbound.poll_seconds
    );
    info!("  Links: {}", config.links.path);

    let links = Arc::new(JsonLinkRepository::open(&config.links.path));

    let config = ConfigHolder::new(config);

    // ============================================================
    // Wire the bridge
    // ============================================================
    let gateway = Arc::new(HttpGateway::new(config.clone())?);
    let game = Arc::new(ConsoleGame::default());

    let router = Arc::new(
        InboundCommandRouter::new(config.clone())
            .register(
                "say",
                Arc::new(SayCommand::new(game.clone(), NameResolver::new(links.clone()))),
            )
            .register("online", Arc::new(OnlineCommand::new(game.clone(), gateway.clone()))),
    );
    info!("Telegram commands: {}", router.command_names().join(", "));

    let poller = Arc::new(Poller::new(gateway.clone(), router));
    let relay = ServiceRelay::new(config.clone(), gateway.clone());
    let session = ConsoleSession::new(
        game,
        relay.clone(),
        LinkAdmin::new(links),
        config.clone(),
        config_path.clone(),
    );

    relay.on_server_starting();
    if config.get().inbound_enabled() {
        poller.start();
    }

    // ============================================================
    // Background tasks
    // ============================================================

    // Start or stop polling when a reload flips inbound.
    let reload_task = tokio::spawn(poller.clone().follow_config(config.subscribe()));
    let hangup_task = tokio::spawn(reload_on_hangup(config.clone(), config_path));

    // ============================================================
    // Run until the console closes or a signal arrives
    // ============================================================
    tokio::select! {
        _ = shutdown_signal() => info!("Shutdown signal received"),
        _ = session.run(BufReader::new(tokio::io::stdin())) => {}
    }

    relay.on_server_stopping();
    reload_task.abort();
    hangup_task.abort();
    poller.stop();

    let sender = gateway.sender();
    sender.shutdown(SEND_DRAIN_TIMEOUT).await;

    let stats = sender.stats();
    info!(
        "Sent {} message(s), {} failed, {} discarded",
        stats.completed, stats.failed, stats.discarded
    );

    info!("Exiting...");
    Ok(())
}

/// Re-read the config file on SIGHUP.
async fn reload_on_hangup(holder: ConfigHolder, path: String) {
    #[cfg(unix)]
    {
        let mut hangup = match signal::unix::signal(signal::unix::SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(e) => {
                warn!("Failed to install SIGHUP handler: {}", e);
                return;
            }
        };

        while hangup.recv().await.is_some() {
            info!("Received SIGHUP");
            if let Err(e) = config::reload(&holder, &path) {
                error!("Configuration reload failed: {}", e);
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = (holder, path);
        std::future::pending::<()>().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
