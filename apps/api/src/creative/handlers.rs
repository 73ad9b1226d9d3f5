//! Axum route handlers for creative generation.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::creative::generator::{CreativeMetadata, CreativeResult};
use crate::creative::styled::{StyledImage, StyledRequest};
use crate::errors::AppError;
use crate::pipeline::handlers::PromptRequest;
use crate::pipeline::FinalizedPrompts;
use crate::state::AppState;

const DEFAULT_RECENT_LIMIT: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreativeRequest {
    pub prompt: String,
    #[serde(default)]
    pub metadata: CreativeMetadata,
}

#[derive(Debug, Serialize)]
pub struct CreativeFromInputResponse {
    pub prompts: FinalizedPrompts,
    pub creative: CreativeResult,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecentResponse {
    pub creatives: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/creatives
///
/// Generation failures are reported in the body with `success = false`.
pub async fn handle_generate_creative(
    State(state): State<AppState>,
    Json(request): Json<CreativeRequest>,
) -> Result<Json<CreativeResult>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    info!(%request_id, prompt_chars = request.prompt.chars().count(), "Creative requested");

    let result = state
        .creatives
        .generate_from_prompt(&request.prompt, request.metadata)
        .await;
    Ok(Json(result))
}

/// POST /api/v1/creatives/from-input
///
/// Runs the prompt pipeline, then generates from its cinematic prompt.
pub async fn handle_creative_from_input(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<CreativeFromInputResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let prompts = state
        .pipeline
        .process(request.input, request.enable_text_rendering, request.quality_level)
        .await?;
    let creative = state.creatives.generate_from_finalized(&prompts).await;
    info!(%request_id, success = creative.success, "Creative from input finished");
    Ok(Json(CreativeFromInputResponse { prompts, creative }))
}

/// POST /api/v1/creatives/styled
///
/// Returns the image base64-encoded; nothing is written to disk.
pub async fn handle_styled_creative(
    State(state): State<AppState>,
    Json(request): Json<StyledRequest>,
) -> Result<Json<StyledImage>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt cannot be empty".to_string()));
    }

    let image = state.styled.generate(&request).await?;
    Ok(Json(image))
}

/// GET /api/v1/creatives/recent?limit=N
pub async fn handle_recent_creatives(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    Json(RecentResponse {
        creatives: state.creatives.recent_creatives(limit).await,
    })
}
