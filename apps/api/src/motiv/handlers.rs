use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::motiv::scenario::{ScenarioMotiv, ScenarioRequest};
use crate::motiv::texts::{available_feelings, CreativeTextRequest, FeelingInfo, GeneratedTexts};
use crate::motiv::{convert, MotivRequest, MotivResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FeelingsResponse {
    pub feelings: Vec<FeelingInfo>,
    pub count: usize,
}

/// POST /api/v1/motiv
pub async fn handle_convert_motiv(Json(request): Json<MotivRequest>) -> Json<MotivResponse> {
    Json(convert(&request))
}

/// POST /api/v1/motiv/scenario
pub async fn handle_scenario_motiv(
    State(state): State<AppState>,
    Json(request): Json<ScenarioRequest>,
) -> Json<ScenarioMotiv> {
    Json(state.scenarios.generate(&request).await)
}

/// POST /api/v1/texts
pub async fn handle_generate_texts(
    State(state): State<AppState>,
    Json(request): Json<CreativeTextRequest>,
) -> Result<Json<GeneratedTexts>, AppError> {
    if request.company.trim().is_empty() || request.job_title.trim().is_empty() {
        return Err(AppError::Validation(
            "company and job_title are required".to_string(),
        ));
    }
    Ok(Json(state.texts.generate(&request).await))
}

/// GET /api/v1/texts/feelings
pub async fn handle_list_feelings() -> Json<FeelingsResponse> {
    let feelings = available_feelings();
    Json(FeelingsResponse {
        count: feelings.len(),
        feelings,
    })
}
