//! Axum route handlers for the prompt pipeline.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::catalog::LayoutSummary;
use crate::pipeline::input::RawCreativeInput;
use crate::pipeline::{FinalizedPrompts, QualityLevel};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Creative fields at the top level plus rendering options.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRequest {
    #[serde(flatten)]
    pub input: RawCreativeInput,
    #[serde(default)]
    pub enable_text_rendering: bool,
    #[serde(default)]
    pub quality_level: QualityLevel,
}

#[derive(Debug, Serialize)]
pub struct LayoutsResponse {
    pub count: usize,
    pub layouts: Vec<LayoutSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/layouts
pub async fn handle_list_layouts(State(state): State<AppState>) -> Json<LayoutsResponse> {
    let layouts = state.pipeline.catalog().summaries();
    Json(LayoutsResponse {
        count: layouts.len(),
        layouts,
    })
}

/// POST /api/v1/prompts
///
/// Runs input processing, layout integration and finalization; writes the
/// prompt files and report to the output directory.
pub async fn handle_generate_prompts(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<FinalizedPrompts>, AppError> {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        layout = request.input.layout_id.as_deref().unwrap_or_default(),
        "Prompt generation requested"
    );

    let finalized = state
        .pipeline
        .process(request.input, request.enable_text_rendering, request.quality_level)
        .await?;
    info!(%request_id, score = finalized.quality_assessment.overall_score, "Prompt generation finished");
    Ok(Json(finalized))
}
