use std::sync::Arc;

use crate::config::Config;
use crate::creative::generator::CreativeGenerator;
use crate::creative::styled::StyledImageGenerator;
use crate::motiv::scenario::ScenarioMotivGenerator;
use crate::motiv::texts::CreativeTextGenerator;
use crate::pipeline::MultiPromptPipeline;
use crate::workflow::QualityWorkflow;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: MultiPromptPipeline,
    pub workflow: QualityWorkflow,
    pub creatives: CreativeGenerator,
    pub styled: StyledImageGenerator,
    pub texts: CreativeTextGenerator,
    pub scenarios: ScenarioMotivGenerator,
}
