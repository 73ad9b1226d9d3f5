//! Axum route handlers for the quality workflow.

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::input::RawCreativeInput;
use crate::pipeline::QualityLevel;
use crate::state::AppState;
use crate::workflow::integration::EnhancedWorkflowResult;
use crate::workflow::WorkflowSettings;

fn default_generate_image() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityWorkflowRequest {
    #[serde(flatten)]
    pub input: RawCreativeInput,
    #[serde(default)]
    pub enable_text_rendering: bool,
    #[serde(default)]
    pub quality_level: QualityLevel,
    /// Falls back to `TARGET_QUALITY_SCORE`.
    pub target_quality_score: Option<u32>,
    /// Falls back to `MAX_ATTEMPTS`.
    pub max_attempts: Option<u32>,
    #[serde(default = "default_generate_image")]
    pub generate_image: bool,
}

/// POST /api/v1/prompts/quality
///
/// Runs the quality loop and, when it reaches the target, generates an image
/// from the final prompt.
pub async fn handle_quality_workflow(
    State(state): State<AppState>,
    Json(request): Json<QualityWorkflowRequest>,
) -> Result<Json<EnhancedWorkflowResult>, AppError> {
    let target = request
        .target_quality_score
        .unwrap_or(state.config.target_quality_score);
    if target > 100 {
        return Err(AppError::Validation(
            "target_quality_score must be between 0 and 100".to_string(),
        ));
    }

    let settings = WorkflowSettings {
        target_quality_score: target,
        max_attempts: request.max_attempts.unwrap_or(state.config.max_attempts),
    };
    let generator = request.generate_image.then_some(&state.creatives);
    let request_id = Uuid::new_v4();
    info!(%request_id, target_score = target, max_attempts = settings.max_attempts, "Quality workflow requested");

    let result = state
        .workflow
        .run_enhanced(
            request.input,
            request.enable_text_rendering,
            request.quality_level,
            settings,
            generator,
            &state.config.output_dir,
        )
        .await;
    info!(%request_id, success = result.success, "Quality workflow finished");
    Ok(Json(result))
}
