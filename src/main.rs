//! vhstatus - Valheim dedicated server status from the console log
//!
//! The service:
//! - Replays the rotated console log archives at startup
//! - Follows the live console log for new lines
//! - Folds recognised events into one shared server status aggregate
//! - Serves point-in-time snapshots of that status as JSON

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use clap::Parser;
use tokio::sync::mpsc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::application::services::StatusService;
use crate::infrastructure::config::{AppConfig, Cli};
use crate::infrastructure::http;
use crate::infrastructure::ingest_worker::ingest_worker;
use crate::infrastructure::log_directory::{discover_history, live_log_path};
use crate::infrastructure::log_source::replay_then_follow;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vhstatus=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting vhstatus");

    // Load configuration
    let config = AppConfig::from_env()?.with_cli(Cli::parse());
    tracing::info!("Configuration loaded");
    tracing::info!("  Log directory: {}", config.log_dir.display());
    tracing::info!("  Replay archives: {}", config.replay_history);

    let status = StatusService::new();
    let state = Arc::new(AppState::new(status.clone()));

    // Locate the archives before anything is spawned so a bad directory fails fast
    let history = if config.replay_history {
        discover_history(&config.log_dir)
            .await
            .context("Failed to discover archived console logs")?
    } else {
        Vec::new()
    };
    let live = live_log_path(&config.log_dir);
    tracing::info!("  Archived logs: {}", history.len());
    tracing::info!("  Live log: {}", live.display());

    // Log reader -> ingest worker
    let (tx, rx) = mpsc::channel(config.event_buffer.max(1));

    let ingest_task = tokio::spawn(ingest_worker(rx, status));

    let mut log_task = {
        let poll_interval = config.follow_poll_interval;
        tokio::spawn(async move { replay_then_follow(&history, &live, poll_interval, tx).await })
    };

    // Build the router
    let app = Router::new()
        .route("/health", get(health_check))
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(listener, app);

    let outcome = tokio::select! {
        result = server => {
            result.context("HTTP server error")
        }
        result = &mut log_task => {
            match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => {
                    tracing::error!("Log reader stopped: {}", e);
                    Err(e.into())
                }
                Err(e) => Err(anyhow::anyhow!("Log reader task failed: {}", e)),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping log reader...");
            Ok(())
        }
    };

    log_task.abort();
    ingest_task.abort();
    tracing::info!("Workers stopped");

    outcome
}

async fn health_check() -> &'static str {
    "OK"
}
