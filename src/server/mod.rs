//! HTTP surface for the sentence operations.
//!
//! ```text
//! GET  /health
//! POST /group-sentences
//! POST /synthesize
//! ```
//!
//! Handlers translate between JSON bodies and [`SentenceService`] calls;
//! engine lifecycle is driven by the binary, not by this module.

mod api;

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use crate::service::SentenceService;

pub use api::{GroupSentencesResponse, SentencesRequest, SynthesizeResponse};

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler.
///
/// Cheap to clone; the service is reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SentenceService>,
}

impl AppState {
    pub fn new(service: Arc<SentenceService>) -> Self {
        Self { service }
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health",          get(api::health))
        .route("/group-sentences", post(api::group_sentences))
        .route("/synthesize",      post(api::synthesize))
        .with_state(state)
}

// ── Server loop ───────────────────────────────────────────────────────────────

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server shut down");
    Ok(())
}
