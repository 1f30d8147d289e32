//! Handlers for the public routes.
//!
//! Error bodies are `{ "detail": ... }` with a generic message; internal
//! error text is logged, never returned.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use super::AppState;
use crate::error::LlmError;

// ── Request / response types ──────────────────────────────────────────────────

/// Body of both POST endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SentencesRequest {
    pub sentences: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct GroupSentencesResponse {
    pub groups: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SynthesizeResponse {
    pub paragraph: String,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

/// Unwrap and validate a request body; the error is a ready 422 response.
fn validate(payload: Result<Json<SentencesRequest>, JsonRejection>) -> Result<Vec<String>, Response> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("rejected request body: {rejection}");
        detail(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text())
    })?;

    if request.sentences.is_empty() {
        return Err(detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "sentences must contain at least 1 item",
        ));
    }
    Ok(request.sentences)
}

fn service_error(err: &LlmError) -> Response {
    if err.is_unavailable() {
        error!("LLM service error: {err}");
        detail(StatusCode::SERVICE_UNAVAILABLE, "LLM service unavailable")
    } else {
        error!("Unexpected error: {err}");
        detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health, independent of engine state.
pub(super) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// POST /group-sentences
pub(super) async fn group_sentences(
    State(state): State<AppState>,
    payload: Result<Json<SentencesRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("group_sentences", %request_id);

    async move {
        let sentences = match validate(payload) {
            Ok(sentences) => sentences,
            Err(response) => return response,
        };
        info!("Received group-sentences request with {} sentences", sentences.len());

        match state.service.group_sentences(&sentences).await {
            Ok(groups) => {
                info!("Grouped sentences into {} groups", groups.len());
                Json(GroupSentencesResponse { groups }).into_response()
            }
            Err(e) => service_error(&e),
        }
    }
    .instrument(span)
    .await
}

/// POST /synthesize
pub(super) async fn synthesize(
    State(state): State<AppState>,
    payload: Result<Json<SentencesRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("synthesize", %request_id);

    async move {
        let sentences = match validate(payload) {
            Ok(sentences) => sentences,
            Err(response) => return response,
        };
        info!("Received synthesize request with {} sentences", sentences.len());

        match state.service.synthesize(&sentences).await {
            Ok(paragraph) => {
                info!("Synthesized paragraph");
                Json(SynthesizeResponse { paragraph }).into_response()
            }
            Err(e) => service_error(&e),
        }
    }
    .instrument(span)
    .await
}
