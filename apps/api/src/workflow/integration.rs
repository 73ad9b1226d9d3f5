//! Enhanced workflow: quality loop, optional image generation from the final
//! prompt, and a persisted result plus YAML summary.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::creative::generator::{CreativeGenerator, CreativeMetadata, CreativeResult};
use crate::pipeline::input::RawCreativeInput;
use crate::pipeline::QualityLevel;
use crate::workflow::{QualityWorkflow, WorkflowResult, WorkflowSettings};

pub const WORKFLOWS_DIR: &str = "quality_workflows";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptImprovement {
    pub length_change: i64,
    pub length_change_percentage: f64,
    pub score_improvement: i64,
    pub original_length: usize,
    pub final_length: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnhancedWorkflowResult {
    pub success: bool,
    pub workflow_success: bool,
    pub image_success: Option<bool>,
    pub final_quality_score: u32,
    pub target_quality_score: u32,
    pub attempts_used: u32,
    pub optimization_strategy: String,
    pub original_prompt: String,
    pub final_prompt: String,
    pub prompt_improvement: PromptImprovement,
    pub image_result: Option<CreativeResult>,
    pub image_path: Option<String>,
    pub workflow_id: String,
    pub error_message: Option<String>,
    pub processing_time: f64,
    pub timestamp: String,
    pub workflow_result: WorkflowResult,
}

#[derive(Debug, Serialize)]
struct WorkflowSummary<'a> {
    workflow_id: &'a str,
    success: bool,
    workflow_success: bool,
    image_success: Option<bool>,
    final_quality_score: u32,
    target_quality_score: u32,
    attempts_used: u32,
    optimization_strategy: &'a str,
    processing_time: f64,
    timestamp: &'a str,
    prompt_improvement: &'a PromptImprovement,
    image_path: Option<&'a str>,
}

/// Length and score change between the original and final prompt.
pub fn prompt_improvement(workflow: &WorkflowResult) -> PromptImprovement {
    if workflow.original_prompt.is_empty() || workflow.final_prompt.is_empty() {
        return PromptImprovement::default();
    }

    let original_length = workflow.original_prompt.chars().count();
    let final_length = workflow.final_prompt.chars().count();
    let length_change = final_length as i64 - original_length as i64;

    let score_improvement = match (workflow.quality_history.first(), workflow.quality_history.last()) {
        (Some(first), Some(last)) if workflow.quality_history.len() >= 2 => {
            i64::from(last.score) - i64::from(first.score)
        }
        _ => 0,
    };

    PromptImprovement {
        length_change,
        length_change_percentage: length_change as f64 / original_length as f64 * 100.0,
        score_improvement,
        original_length,
        final_length,
    }
}

impl QualityWorkflow {
    /// Runs the loop and, only when it succeeds, generates an image from the
    /// final prompt when `generator` is given. Results are saved under
    /// `output_root/quality_workflows`.
    pub async fn run_enhanced(
        &self,
        raw: RawCreativeInput,
        enable_text_rendering: bool,
        quality_level: QualityLevel,
        settings: WorkflowSettings,
        generator: Option<&CreativeGenerator>,
        output_root: &Path,
    ) -> EnhancedWorkflowResult {
        let started = Instant::now();
        info!(image = generator.is_some(), "Starting enhanced quality workflow");

        let workflow = self
            .run(raw, enable_text_rendering, quality_level, settings)
            .await;

        if !workflow.success {
            let message = workflow.error_message.clone().unwrap_or_else(|| {
                format!(
                    "Quality target {} not reached (best score {})",
                    workflow.target_quality_score, workflow.final_quality_score
                )
            });
            error!("Quality workflow unsuccessful: {message}");
            return finish(workflow, None, false, Some(message), started);
        }

        let image_result = match generator {
            Some(generator) if !workflow.final_prompt.is_empty() => {
                let metadata = workflow_metadata(&workflow);
                Some(generator.generate_from_prompt(&workflow.final_prompt, metadata).await)
            }
            _ => None,
        };

        let result = finish(workflow, image_result, true, None, started);
        if let Err(e) = save_workflow_result(&output_root.join(WORKFLOWS_DIR), &result).await {
            error!("Workflow result not saved: {e}");
        }

        info!(
            score = result.final_quality_score,
            target = result.target_quality_score,
            attempts = result.attempts_used,
            seconds = result.processing_time,
            image = ?result.image_path,
            "Enhanced workflow complete"
        );
        result
    }
}

fn workflow_metadata(workflow: &WorkflowResult) -> CreativeMetadata {
    let input = workflow
        .finalized
        .as_ref()
        .map(|f| &f.layout_data.structured_input);

    CreativeMetadata {
        company: input.map(|i| i.company.clone()).filter(|c| !c.is_empty()),
        headline: input.map(|i| i.headline.clone()),
        layout_id: input.map(|i| i.layout_id.clone()),
        timestamp: Some(Local::now().format("%Y%m%d_%H%M%S").to_string()),
        workflow_type: Some("quality_workflow".to_string()),
        workflow_id: Some(workflow.workflow_id.clone()),
        target_quality_score: Some(workflow.target_quality_score),
        final_quality_score: Some(workflow.final_quality_score),
        attempts_used: Some(workflow.attempts_used),
        optimization_strategy: Some(workflow.last_strategy().to_string()),
        ..Default::default()
    }
}

fn finish(
    workflow: WorkflowResult,
    image_result: Option<CreativeResult>,
    success: bool,
    error_message: Option<String>,
    started: Instant,
) -> EnhancedWorkflowResult {
    let image_path = image_result.as_ref().and_then(|r| r.image_path.clone());
    EnhancedWorkflowResult {
        success,
        workflow_success: workflow.success,
        image_success: image_result.as_ref().map(|r| r.success),
        final_quality_score: workflow.final_quality_score,
        target_quality_score: workflow.target_quality_score,
        attempts_used: workflow.attempts_used,
        optimization_strategy: workflow.last_strategy().to_string(),
        original_prompt: workflow.original_prompt.clone(),
        final_prompt: workflow.final_prompt.clone(),
        prompt_improvement: prompt_improvement(&workflow),
        image_result,
        image_path,
        workflow_id: workflow.workflow_id.clone(),
        error_message,
        processing_time: started.elapsed().as_secs_f64(),
        timestamp: Local::now().to_rfc3339(),
        workflow_result: workflow,
    }
}

async fn save_workflow_result(
    dir: &Path,
    result: &EnhancedWorkflowResult,
) -> anyhow::Result<(PathBuf, PathBuf)> {
    tokio::fs::create_dir_all(dir).await?;

    let json_path = dir.join(format!("{}_result.json", result.workflow_id));
    tokio::fs::write(&json_path, serde_json::to_vec_pretty(result)?).await?;

    let summary = WorkflowSummary {
        workflow_id: &result.workflow_id,
        success: result.success,
        workflow_success: result.workflow_success,
        image_success: result.image_success,
        final_quality_score: result.final_quality_score,
        target_quality_score: result.target_quality_score,
        attempts_used: result.attempts_used,
        optimization_strategy: &result.optimization_strategy,
        processing_time: result.processing_time,
        timestamp: &result.timestamp,
        prompt_improvement: &result.prompt_improvement,
        image_path: result.image_path.as_deref(),
    };
    let yaml_path = dir.join(format!("{}_summary.yaml", result.workflow_id));
    tokio::fs::write(&yaml_path, serde_yaml::to_string(&summary)?).await?;

    if result.image_success == Some(false) {
        warn!("Workflow saved without an image");
    }
    info!(file = %json_path.display(), "Workflow result saved");
    Ok((json_path, yaml_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::creative::generator::tests::{FakeBackend, FakeOptimizer};
    use crate::workflow::tests::{make_raw, make_workflow, RecordingOptimizer};
    use crate::workflow::QualityHistoryEntry;

    fn history(scores: &[u32]) -> Vec<QualityHistoryEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| QualityHistoryEntry {
                attempt: i as u32 + 1,
                score: *score,
                strategy: "style_optimization".to_string(),
                prompt_length: 0,
                timestamp: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_prompt_improvement_math() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = make_workflow(Arc::new(RecordingOptimizer::new(false)), dir.path());
        let mut result = workflow
            .run(make_raw(), false, QualityLevel::High, WorkflowSettings::default())
            .await;

        result.original_prompt = "a".repeat(200);
        result.final_prompt = "b".repeat(250);
        result.quality_history = history(&[78, 83, 88]);

        let improvement = prompt_improvement(&result);
        assert_eq!(improvement.length_change, 50);
        assert_eq!(improvement.length_change_percentage, 25.0);
        assert_eq!(improvement.score_improvement, 10);

        result.quality_history = history(&[78]);
        assert_eq!(prompt_improvement(&result).score_improvement, 0);

        result.final_prompt.clear();
        assert_eq!(prompt_improvement(&result), PromptImprovement::default());
    }

    #[tokio::test]
    async fn test_enhanced_success_generates_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = make_workflow(Arc::new(RecordingOptimizer::new(false)), dir.path());
        let generator = CreativeGenerator::new(
            Arc::new(FakeBackend::base64()),
            Arc::new(FakeOptimizer { reply: None }),
            dir.path(),
        );
        let settings = WorkflowSettings {
            target_quality_score: 50,
            max_attempts: 3,
        };

        let result = workflow
            .run_enhanced(make_raw(), false, QualityLevel::High, settings, Some(&generator), dir.path())
            .await;

        assert!(result.success);
        assert_eq!(result.image_success, Some(true));
        assert!(result.image_path.is_some());

        let saved = dir.path().join(WORKFLOWS_DIR);
        assert!(saved.join(format!("{}_result.json", result.workflow_id)).exists());
        let summary: serde_yaml::Value = serde_yaml::from_str(
            &std::fs::read_to_string(saved.join(format!("{}_summary.yaml", result.workflow_id))).unwrap(),
        )
        .unwrap();
        assert_eq!(summary["workflow_success"], serde_yaml::Value::Bool(true));
    }

    #[tokio::test]
    async fn test_enhanced_failure_skips_image_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let workflow = make_workflow(Arc::new(RecordingOptimizer::new(false)), dir.path());
        let backend = Arc::new(FakeBackend::base64());
        let generator = CreativeGenerator::new(
            backend.clone(),
            Arc::new(FakeOptimizer { reply: None }),
            dir.path(),
        );
        let settings = WorkflowSettings {
            target_quality_score: 101,
            max_attempts: 1,
        };

        let result = workflow
            .run_enhanced(make_raw(), false, QualityLevel::High, settings, Some(&generator), dir.path())
            .await;

        assert!(!result.success);
        assert!(result.image_result.is_none());
        assert!(result.error_message.unwrap().contains("not reached"));
        assert!(backend.requests.lock().unwrap().is_empty());
        assert!(!dir.path().join(WORKFLOWS_DIR).exists());
    }
}
