// Quality workflow: bounded retry loop that re-optimizes the DALL-E prompt
// until the heuristic score reaches the target.
// All optimizer calls go through llm_client::TextOptimizer.

pub mod handlers;
pub mod integration;
pub mod prompts;

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::TextOptimizer;
use crate::pipeline::input::RawCreativeInput;
use crate::pipeline::quality::assess_overall_quality;
use crate::pipeline::{FinalizedPrompts, MultiPromptPipeline, QualityLevel};
use prompts::{
    CRITICAL_OPTIMIZATION_SYSTEM, FINE_TUNING_SYSTEM, STRUCTURE_OPTIMIZATION_SYSTEM,
    STYLE_OPTIMIZATION_SYSTEM,
};

pub const DEFAULT_TARGET_SCORE: u32 = 85;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const INITIAL_STRATEGY: &str = "initial_generation";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    CriticalOptimization,
    StructureOptimization,
    StyleOptimization,
    FineTuning,
}

impl Strategy {
    pub fn for_score(score: u32) -> Self {
        match score {
            0..=59 => Strategy::CriticalOptimization,
            60..=74 => Strategy::StructureOptimization,
            75..=84 => Strategy::StyleOptimization,
            _ => Strategy::FineTuning,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CriticalOptimization => "critical_optimization",
            Strategy::StructureOptimization => "structure_optimization",
            Strategy::StyleOptimization => "style_optimization",
            Strategy::FineTuning => "fine_tuning",
        }
    }

    pub fn system_message(&self) -> &'static str {
        match self {
            Strategy::CriticalOptimization => CRITICAL_OPTIMIZATION_SYSTEM,
            Strategy::StructureOptimization => STRUCTURE_OPTIMIZATION_SYSTEM,
            Strategy::StyleOptimization => STYLE_OPTIMIZATION_SYSTEM,
            Strategy::FineTuning => FINE_TUNING_SYSTEM,
        }
    }

    /// Added to the reassessed score, capped at 100.
    pub fn bonus(&self) -> u32 {
        match self {
            Strategy::CriticalOptimization => 5,
            Strategy::StructureOptimization => 3,
            Strategy::StyleOptimization => 2,
            Strategy::FineTuning => 1,
        }
    }

    fn failure_label(&self) -> &'static str {
        match self {
            Strategy::CriticalOptimization => "Critical optimization",
            Strategy::StructureOptimization => "Structure optimization",
            Strategy::StyleOptimization => "Style optimization",
            Strategy::FineTuning => "Fine tuning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    pub target_quality_score: u32,
    pub max_attempts: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            target_quality_score: DEFAULT_TARGET_SCORE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptHistoryEntry {
    pub attempt: u32,
    pub strategy: String,
    pub prompt_length: usize,
    pub quality_score: u32,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityHistoryEntry {
    pub attempt: u32,
    pub score: u32,
    pub strategy: String,
    pub prompt_length: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub success: bool,
    pub workflow_completed: bool,
    pub final_quality_score: u32,
    pub target_quality_score: u32,
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub final_prompt: String,
    pub original_prompt: String,
    pub prompt_history: Vec<PromptHistoryEntry>,
    pub quality_history: Vec<QualityHistoryEntry>,
    pub workflow_id: String,
    pub error_message: Option<String>,
    pub processing_time: f64,
    /// Initial pipeline output; absent when the initial generation failed.
    #[serde(skip)]
    pub finalized: Option<FinalizedPrompts>,
}

impl WorkflowResult {
    /// Strategy of the last scored step, `"unknown"` before any.
    pub fn last_strategy(&self) -> &str {
        self.quality_history
            .last()
            .map(|entry| entry.strategy.as_str())
            .unwrap_or("unknown")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Workflow
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct QualityWorkflow {
    pipeline: MultiPromptPipeline,
    optimizer: Arc<dyn TextOptimizer>,
}

fn now_iso() -> String {
    Local::now().to_rfc3339()
}

impl QualityWorkflow {
    pub fn new(pipeline: MultiPromptPipeline, optimizer: Arc<dyn TextOptimizer>) -> Self {
        Self { pipeline, optimizer }
    }

    pub fn pipeline(&self) -> &MultiPromptPipeline {
        &self.pipeline
    }

    /// Runs the loop. Never fails: initial generation errors end the workflow
    /// with `success = false`, optimizer errors keep the prompt and count the attempt.
    pub async fn run(
        &self,
        raw: RawCreativeInput,
        enable_text_rendering: bool,
        quality_level: QualityLevel,
        settings: WorkflowSettings,
    ) -> WorkflowResult {
        let started = Instant::now();
        let workflow_id = format!("quality_workflow_{}", Local::now().format("%Y%m%d_%H%M%S"));
        info!(
            %workflow_id,
            target = settings.target_quality_score,
            max_attempts = settings.max_attempts,
            "Starting quality workflow"
        );

        let mut result = WorkflowResult {
            success: false,
            workflow_completed: true,
            final_quality_score: 0,
            target_quality_score: settings.target_quality_score,
            attempts_used: 1,
            max_attempts: settings.max_attempts,
            final_prompt: String::new(),
            original_prompt: String::new(),
            prompt_history: Vec::new(),
            quality_history: Vec::new(),
            workflow_id,
            error_message: None,
            processing_time: 0.0,
            finalized: None,
        };

        let finalized = match self
            .pipeline
            .process(raw, enable_text_rendering, quality_level)
            .await
        {
            Ok(finalized) => finalized,
            Err(e) => {
                warn!("Initial prompt generation failed: {e}");
                result.error_message = Some(format!("Initial generation failed: {e}"));
                result.processing_time = started.elapsed().as_secs_f64();
                return result;
            }
        };

        let mut attempt = 1;
        let mut score = finalized.quality_assessment.overall_score;
        let mut current = finalized.dalle_prompt.clone();

        result.original_prompt = current.clone();
        result.prompt_history.push(PromptHistoryEntry {
            attempt,
            strategy: INITIAL_STRATEGY.to_string(),
            prompt_length: current.chars().count(),
            quality_score: score,
            timestamp: now_iso(),
        });
        result.quality_history.push(QualityHistoryEntry {
            attempt,
            score,
            strategy: INITIAL_STRATEGY.to_string(),
            prompt_length: current.chars().count(),
            timestamp: now_iso(),
        });
        info!(score, prompt_len = current.chars().count(), "Initial prompt scored");

        loop {
            if score >= settings.target_quality_score {
                info!(score, target = settings.target_quality_score, "Target quality reached");
                result.success = true;
                break;
            }
            if attempt >= settings.max_attempts {
                warn!(score, max_attempts = settings.max_attempts, "Attempts exhausted");
                break;
            }

            let strategy = Strategy::for_score(score);
            info!(attempt, strategy = strategy.as_str(), "Optimizing prompt");

            match self
                .optimizer
                .optimize(&current, Some(strategy.system_message()))
                .await
            {
                Ok(optimized) => current = optimized,
                Err(e) => {
                    warn!("{} failed, keeping prompt: {e}", strategy.failure_label());
                    result.error_message = Some(format!("{} failed: {e}", strategy.failure_label()));
                }
            }
            attempt += 1;

            let assessed = assess_overall_quality(
                &finalized.layout_data,
                &finalized.midjourney_prompt,
                &current,
            )
            .overall_score;
            score = (assessed + strategy.bonus()).min(100);

            let prompt_length = current.chars().count();
            result.prompt_history.push(PromptHistoryEntry {
                attempt,
                strategy: strategy.as_str().to_string(),
                prompt_length,
                quality_score: score,
                timestamp: now_iso(),
            });
            result.quality_history.push(QualityHistoryEntry {
                attempt,
                score,
                strategy: strategy.as_str().to_string(),
                prompt_length,
                timestamp: now_iso(),
            });
            info!(score, strategy = strategy.as_str(), "Prompt reassessed");
        }

        result.final_quality_score = score;
        result.attempts_used = attempt;
        result.final_prompt = current;
        result.finalized = Some(finalized);
        result.processing_time = started.elapsed().as_secs_f64();
        result
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
