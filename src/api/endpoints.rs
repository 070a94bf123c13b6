//! API endpoint handlers
//!
//! This module implements the HTTP endpoints of the router: the multi-provider
//! compare endpoint, its single-provider variant, and service/health info.

use crate::api::error::ApiError;
use crate::core::config::Config;
use crate::core::constants::{text, tokens};
use crate::core::provider::{ProviderId, ProviderSet};
use crate::fetchers::CaptionSource;
use crate::models::compare::{CompareRequest, SingleProviderRequest};
use crate::pipeline::{UseCaseInput, fan_out};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub providers: ProviderSet,
    pub captions: Arc<dyn CaptionSource>,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/compare", post(compare))
        .route("/api/compare/{provider}", post(compare_single))
        .route("/health", get(health_check))
        .with_state(state)
}

/// POST /api/compare - Fan a prompt out to the selected providers
async fn compare(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = info_span!("compare", request_id = %request_id);

    handle_compare(state, body).instrument(span).await
}

async fn handle_compare(state: AppState, body: Bytes) -> Result<Response, ApiError> {
    let request: CompareRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Malformed compare request: {}", e);
        ApiError::Internal(e.to_string())
    })?;

    if !request.has_input() {
        warn!("Prompt or video URL is required but was not provided");
        return Err(ApiError::Validation(text::PROMPT_OR_VIDEO_REQUIRED));
    }

    let selector = request.selector().map_err(|e| {
        error!("Malformed compare request: invalid model {:?}: {}", request.model, e);
        ApiError::Internal(e.to_string())
    })?;

    info!(
        "📥 Received prompt: {:?}, video: {:?}, model: {:?}, use case: {:?}",
        request.prompt(),
        request.video_url(),
        selector,
        request.use_case
    );

    let input = UseCaseInput {
        use_case: request.use_case,
        prompt: request.prompt(),
        video_url: request.video_url(),
    };

    let responses = fan_out(
        &state.providers,
        state.captions.as_ref(),
        selector,
        &input,
    )
    .await;

    info!("Returning {} provider responses", responses.len());
    Ok(Json(responses).into_response())
}

/// POST /api/compare/{provider} - Send a plain prompt to one provider
async fn compare_single(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = ProviderId::from_str(&provider).ok_or_else(|| {
        warn!("Unknown provider requested: {}", provider);
        ApiError::NotFound(text::UNKNOWN_PROVIDER)
    })?;

    let request: SingleProviderRequest = serde_json::from_slice(&body).map_err(|e| {
        error!("Malformed {} request: {}", id, e);
        ApiError::Internal(e.to_string())
    })?;

    let prompt = request.prompt.as_deref().unwrap_or("").trim();
    if prompt.is_empty() {
        warn!("Prompt is required but was not provided");
        return Err(ApiError::Validation(text::PROMPT_REQUIRED));
    }

    info!("📥 Received prompt for {}: {:?}", id, prompt);

    let answer = state
        .providers
        .get(id)
        .respond(None, prompt, tokens::SHORT_ANSWER)
        .await
        .map_err(|e| {
            error!("{} API error: {}", id, e);
            ApiError::Internal(e.to_string())
        })?;

    debug!("{} response: {}", id, answer);

    let mut body = serde_json::Map::new();
    body.insert(id.as_str().to_string(), answer.into());
    Ok(Json(serde_json::Value::Object(body)).into_response())
}

/// GET / - Root endpoint
async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": format!("Omacare router v{}", env!("CARGO_PKG_VERSION")),
        "status": "running",
        "models": {
            "chatgpt": state.config.openai_model,
            "haiku": state.config.anthropic_model,
            "ollama": state.config.ollama_model,
        },
        "endpoints": {
            "compare": "/api/compare",
            "compare_single": "/api/compare/{provider}",
            "health": "/health",
        },
    }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let providers: serde_json::Map<String, serde_json::Value> = ProviderId::ALL
        .iter()
        .map(|id| (id.as_str().to_string(), state.config.is_configured(*id).into()))
        .collect();

    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "providers": providers,
    }))
}
