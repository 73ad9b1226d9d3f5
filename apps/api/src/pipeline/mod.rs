// Multi-prompt pipeline: input processing, layout integration, prompt finalization.
// Everything here is local string work; no network calls.

pub mod catalog;
pub mod cinematic;
pub mod colors;
pub mod dalle;
pub mod handlers;
pub mod input;
pub mod integrator;
pub mod midjourney;
pub mod output;
pub mod quality;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use catalog::LayoutCatalog;
use cinematic::{CinematicPrompt, TransformationStats};
use input::RawCreativeInput;
use integrator::LayoutIntegratedData;
use quality::{PromptMetrics, QualityAssessment};

pub use cinematic::QualityLevel;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("layout definition could not be read: {0}")]
    Layout(#[from] serde_yaml::Error),

    #[error("output file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedPrompts {
    pub layout_data: LayoutIntegratedData,
    pub midjourney_prompt: String,
    pub dalle_prompt: String,
    pub cinematic_prompt: CinematicPrompt,
    pub midjourney_metrics: PromptMetrics,
    pub dalle_metrics: PromptMetrics,
    pub quality_assessment: QualityAssessment,
    pub transformation_stats: TransformationStats,
    pub output_files: Vec<String>,
    pub processing_stage: String,
    /// Seconds for the whole run, set by [`MultiPromptPipeline::process`].
    pub total_processing_time: f64,
}

/// Renders all three prompts and their scoring from integrated layout data.
pub fn finalize(
    layout_data: LayoutIntegratedData,
    enable_text_rendering: bool,
    quality_level: QualityLevel,
) -> FinalizedPrompts {
    let midjourney_prompt = midjourney::generate(&layout_data, enable_text_rendering);
    let dalle_prompt = dalle::generate(&layout_data, enable_text_rendering);
    let cinematic_prompt = cinematic::transform(&layout_data, enable_text_rendering, quality_level);

    let midjourney_metrics = quality::midjourney_metrics(&midjourney_prompt);
    let dalle_metrics = quality::dalle_metrics(&dalle_prompt);
    let quality_assessment =
        quality::assess_overall_quality(&layout_data, &midjourney_prompt, &dalle_prompt);
    let transformation_stats =
        cinematic::transformation_stats(&dalle_prompt, &cinematic_prompt.full_prompt);

    info!(
        midjourney = midjourney_metrics.length(),
        dalle = dalle_metrics.length(),
        cinematic = transformation_stats.cinematic_length,
        reduction = transformation_stats.reduction_percentage,
        score = quality_assessment.overall_score,
        "Prompts finalized"
    );

    FinalizedPrompts {
        layout_data,
        midjourney_prompt,
        dalle_prompt,
        cinematic_prompt,
        midjourney_metrics,
        dalle_metrics,
        quality_assessment,
        transformation_stats,
        output_files: Vec::new(),
        processing_stage: "prompts_finalized".to_string(),
        total_processing_time: 0.0,
    }
}

/// Runs input processing, layout integration and finalization, then writes the
/// run's output files.
#[derive(Clone)]
pub struct MultiPromptPipeline {
    catalog: Arc<LayoutCatalog>,
    output_dir: PathBuf,
}

impl MultiPromptPipeline {
    pub fn new(catalog: Arc<LayoutCatalog>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            output_dir: output_dir.into(),
        }
    }

    pub fn catalog(&self) -> &LayoutCatalog {
        &self.catalog
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    pub async fn process(
        &self,
        raw: RawCreativeInput,
        enable_text_rendering: bool,
        quality_level: QualityLevel,
    ) -> Result<FinalizedPrompts, PipelineError> {
        let started = Instant::now();
        info!(enable_text_rendering, quality = quality_level.as_str(), "Starting multi-prompt pipeline");
        if enable_text_rendering {
            warn!("Text rendering enabled; German umlauts may render as corrupt glyphs");
        }

        let structured = input::process_input(raw);
        let layout_data = integrator::integrate(&self.catalog, structured)?;
        let mut finalized = finalize(layout_data, enable_text_rendering, quality_level);

        let files = output::save_output_files(
            &self.output_dir,
            &finalized.layout_data,
            &finalized.midjourney_prompt,
            &finalized.dalle_prompt,
            &finalized.cinematic_prompt,
        )
        .await?;
        finalized.output_files = files
            .iter()
            .map(|path| path.display().to_string())
            .collect();

        finalized.total_processing_time = started.elapsed().as_secs_f64();
        info!(
            seconds = finalized.total_processing_time,
            score = finalized.quality_assessment.overall_score,
            "Multi-prompt pipeline complete"
        );

        Ok(finalized)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_raw() -> RawCreativeInput {
        RawCreativeInput {
            headline: Some("Pflege mit Herz".to_string()),
            subline: Some("Gemeinsam stark für Hamburg".to_string()),
            company: Some("Klinikum Nord".to_string()),
            location: Some("Hamburg".to_string()),
            benefits: vec!["Faire Bezahlung".to_string(), "Flexible Dienste".to_string()],
            layout_id: Some("skizze13_text_motiv_split_cta".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_finalize_fills_every_prompt() {
        let data = integrator::integrate(&LayoutCatalog::default(), input::process_input(make_raw())).unwrap();
        let finalized = finalize(data, false, QualityLevel::High);

        assert!(finalized.midjourney_prompt.contains("--ar"));
        assert!(!finalized.dalle_prompt.is_empty());
        assert!(finalized.cinematic_prompt.full_prompt.starts_with("Ein professionelles Recruiting-Creative"));
        assert_eq!(finalized.processing_stage, "prompts_finalized");
        assert_eq!(
            finalized.transformation_stats.original_length,
            finalized.dalle_prompt.chars().count()
        );
        assert!(finalized.output_files.is_empty());
    }

    #[tokio::test]
    async fn test_process_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = MultiPromptPipeline::new(Arc::new(LayoutCatalog::default()), dir.path());

        let finalized = pipeline.process(make_raw(), true, QualityLevel::Premium).await.unwrap();

        assert_eq!(finalized.output_files.len(), 4);
        assert!(finalized.output_files.iter().all(|f| std::path::Path::new(f).exists()));
        assert_eq!(finalized.layout_data.layout_id, "skizze13_text_motiv_split_cta");
        assert_eq!(finalized.cinematic_prompt.metadata.quality_level, QualityLevel::Premium);
        assert!(finalized.total_processing_time >= 0.0);
    }

    #[tokio::test]
    async fn test_unknown_layout_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = MultiPromptPipeline::new(Arc::new(LayoutCatalog::default()), dir.path());
        let raw = RawCreativeInput {
            layout_id: Some("does_not_exist".to_string()),
            ..make_raw()
        };

        let finalized = pipeline.process(raw, false, QualityLevel::High).await.unwrap();
        assert_eq!(finalized.layout_data.layout_id, catalog::FALLBACK_LAYOUT_ID);
    }

    #[tokio::test]
    async fn test_layout_id_with_separator_stays_in_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = MultiPromptPipeline::new(Arc::new(LayoutCatalog::default()), dir.path());
        let raw = RawCreativeInput {
            layout_id: Some("a/b".to_string()),
            ..make_raw()
        };

        let finalized = pipeline.process(raw, false, QualityLevel::High).await.unwrap();

        assert_eq!(finalized.layout_data.layout_id, catalog::FALLBACK_LAYOUT_ID);
        assert_eq!(finalized.output_files.len(), 4);
        for file in &finalized.output_files {
            let path = std::path::Path::new(file);
            assert!(path.exists());
            assert_eq!(path.parent().unwrap(), dir.path());
            assert!(path.file_name().unwrap().to_string_lossy().contains("_a_b_"));
        }
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_pipeline_error() {
        use axum::response::IntoResponse;

        use crate::errors::AppError;

        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let pipeline =
            MultiPromptPipeline::new(Arc::new(LayoutCatalog::default()), blocker.join("outputs"));

        let err = pipeline
            .process(make_raw(), false, QualityLevel::High)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));

        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "PIPELINE_ERROR");
    }
}
