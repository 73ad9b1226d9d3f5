//! Prompt metrics and the heuristic 0–100 quality assessment.

use serde::{Deserialize, Serialize};

use crate::pipeline::dalle::DALLE_MAX_PROMPT_CHARS;
use crate::pipeline::integrator::LayoutIntegratedData;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "prompt_type", rename_all = "lowercase")]
pub enum PromptMetrics {
    Midjourney {
        length: usize,
        word_count: usize,
        optimal_length: bool,
        has_parameters: bool,
        language: String,
    },
    Dalle {
        length: usize,
        word_count: usize,
        compatible: bool,
        structured: bool,
        language: String,
        has_negative_prompts: bool,
    },
}

impl PromptMetrics {
    pub fn length(&self) -> usize {
        match self {
            PromptMetrics::Midjourney { length, .. } | PromptMetrics::Dalle { length, .. } => *length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub overall_score: u32,
    pub layout_integration_score: u32,
    pub text_mapping_score: u32,
    pub midjourney_score: u32,
    pub dalle_score: u32,
    pub adaptive_score: u32,
    pub recommendations: Vec<String>,
}

pub fn midjourney_metrics(prompt: &str) -> PromptMetrics {
    let length = prompt.chars().count();
    PromptMetrics::Midjourney {
        length,
        word_count: prompt.split_whitespace().count(),
        optimal_length: (200..=800).contains(&length),
        has_parameters: prompt.contains("--ar") && prompt.contains("--style"),
        language: "english".to_string(),
    }
}

pub fn dalle_metrics(prompt: &str) -> PromptMetrics {
    let length = prompt.chars().count();
    PromptMetrics::Dalle {
        length,
        word_count: prompt.split_whitespace().count(),
        compatible: length <= DALLE_MAX_PROMPT_CHARS,
        structured: prompt.contains('—'),
        language: "german".to_string(),
        has_negative_prompts: prompt.contains("VERMEIDEN"),
    }
}

pub fn assess_overall_quality(
    data: &LayoutIntegratedData,
    midjourney_prompt: &str,
    dalle_prompt: &str,
) -> QualityAssessment {
    let layout_integration_score = if data.has_layout_definition { 90 } else { 50 };
    let text_mapping_score = (data.text_placements.len() as u32 * 20).min(100);
    let midjourney_score = if (200..=800).contains(&midjourney_prompt.chars().count()) {
        90
    } else {
        70
    };
    let dalle_score = if dalle_prompt.chars().count() <= DALLE_MAX_PROMPT_CHARS {
        95
    } else {
        50
    };
    let adaptive_score = if data.adaptive_adjustments.is_empty() { 80 } else { 100 };

    let scores = [
        layout_integration_score,
        text_mapping_score,
        midjourney_score,
        dalle_score,
        adaptive_score,
    ];
    let overall_score = scores.iter().sum::<u32>() / scores.len() as u32;

    QualityAssessment {
        overall_score,
        layout_integration_score,
        text_mapping_score,
        midjourney_score,
        dalle_score,
        adaptive_score,
        recommendations: recommendations(data, overall_score),
    }
}

fn recommendations(data: &LayoutIntegratedData, score: u32) -> Vec<String> {
    let mut recommendations = Vec::new();

    if score < 80 {
        recommendations.push("Layout-Integration könnte verbessert werden".to_string());
    }
    if data.text_placements.len() < 3 {
        recommendations.push("Mehr Text-Elemente könnten platziert werden".to_string());
    }
    if data.adaptive_adjustments.is_empty() {
        recommendations.push("Adaptive Anpassungen implementieren".to_string());
    }
    if score >= 90 {
        recommendations.push("Exzellente Prompt-Qualität erreicht!".to_string());
    }

    recommendations
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
