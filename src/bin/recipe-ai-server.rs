// ABOUTME: Server binary for the recipe assistant chat backend
// ABOUTME: Loads configuration, wires storage and the LLM provider, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Recipe AI Server Binary
//!
//! Starts the HTTP API with the storage backend and LLM endpoint named in
//! the environment.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use recipe_ai_server::{
    config::ServerConfig, conversation::InMemoryConversationStore, logging,
    resources::ServerResources, routes,
};
use tokio::net::TcpListener;
use tokio::{signal, time};
use tracing::{debug, error, info};

/// How often expired in-memory sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "recipe-ai-server")]
#[command(about = "Recipe assistant chat backend with usage-metered AI recipe generation")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override HTTP bind host
    #[arg(long)]
    http_host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(http_host) = args.http_host {
        config.http_host = http_host;
    }

    logging::init_from_env()?;

    info!("Starting Recipe AI Server");
    info!("{}", config.summary());

    let bind_address = config.bind_address();
    let resources = Arc::new(ServerResources::from_config(config).await?);

    if let Some(store) = resources.session_store.clone() {
        spawn_session_sweeper(store);
    }

    match resources.orchestrator.gateway().provider().health_check().await {
        Ok(true) => info!("LLM endpoint reachable"),
        Ok(false) => error!("LLM endpoint reported unhealthy; requests may fail"),
        Err(e) => error!("LLM endpoint health check failed: {e}"),
    }

    let app = routes::app(&resources);
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Listening on http://{bind_address}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {e}");
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}

/// Periodically drop expired sessions so idle users do not hold capacity
fn spawn_session_sweeper(store: InMemoryConversationStore) {
    tokio::spawn(async move {
        let mut interval = time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                debug!(removed, "Expired conversation sessions purged");
            }
        }
    });
}

/// Resolves on ctrl-c or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
