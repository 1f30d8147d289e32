//! Semantic Sentence API server
//!
//! Loads the model once, serves HTTP until Ctrl-C/SIGTERM, then releases it.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use semantic_sentence::config::ServerConfig;
use semantic_sentence::llm::{EngineManager, MistralEngineFactory};
use semantic_sentence::server::{self, AppState};
use semantic_sentence::{logging, SentenceService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    logging::init(&config.log_level)?;

    let addr = config.bind_addr().context("invalid bind address")?;
    info!("Starting Semantic Sentence API...");

    let engine = Arc::new(EngineManager::new(MistralEngineFactory::new(
        config.inference_settings(),
    )));

    // Nothing listens until the model is loaded
    if let Err(e) = engine.initialize(config.model.as_deref()).await {
        error!("Failed to initialize LLM service: {e}");
        return Err(e.into());
    }
    info!(
        "LLM service initialized successfully (preset: {})",
        config.preset.display_name()
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let state = AppState::new(Arc::new(SentenceService::new(Arc::clone(&engine))));

    let served = server::serve(listener, state, shutdown_signal()).await;

    info!("Shutting down Semantic Sentence API...");
    engine.terminate().await;
    info!("Shutdown complete");

    served.context("HTTP server error")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("ctrl-c received, initiating shutdown"),
        () = terminate => info!("SIGTERM received, initiating shutdown"),
    }
}
