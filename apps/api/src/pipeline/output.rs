//! Per-run output files: three prompt text files plus a JSON report.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::pipeline::cinematic::CinematicPrompt;
use crate::pipeline::dalle::DALLE_MAX_PROMPT_CHARS;
use crate::pipeline::integrator::{LayoutIntegratedData, LayoutMetrics};
use crate::pipeline::PipelineError;

const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Serialize)]
struct ProcessingStages {
    input_processed: bool,
    layout_integrated: bool,
    prompts_finalized: bool,
}

#[derive(Debug, Serialize)]
struct PromptPreview {
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    compatible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformation_type: Option<String>,
    preview: String,
}

#[derive(Debug, Serialize)]
struct ReportPrompts {
    midjourney: PromptPreview,
    dalle: PromptPreview,
    cinematic: PromptPreview,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    timestamp: &'a str,
    layout_id: &'a str,
    layout_name: &'a str,
    processing_stages: ProcessingStages,
    text_placements_count: usize,
    adaptive_adjustments_count: usize,
    layout_metrics: &'a LayoutMetrics,
    prompts: ReportPrompts,
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{head}...")
}

/// Client-supplied ids reach file names; anything outside `[A-Za-z0-9_-]`
/// becomes `_`.
fn file_token(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') { c } else { '_' })
        .collect()
}

fn midjourney_file(layout_id: &str, timestamp: &str, prompt: &str) -> String {
    format!(
        "# MIDJOURNEY PROMPT - Multi-Prompt-System\n\
         # Layout: {layout_id}\n\
         # Timestamp: {timestamp}\n\
         # Length: {} characters\n\n\
         {prompt}",
        prompt.chars().count()
    )
}

fn dalle_file(layout_id: &str, timestamp: &str, prompt: &str) -> String {
    let length = prompt.chars().count();
    let compatible = if length <= DALLE_MAX_PROMPT_CHARS { "Yes" } else { "No" };
    format!(
        "# DALL-E PROMPT - Multi-Prompt-System\n\
         # Layout: {layout_id}\n\
         # Timestamp: {timestamp}\n\
         # Length: {length} characters\n\
         # Compatible: {compatible}\n\n\
         {prompt}"
    )
}

fn cinematic_file(layout_id: &str, timestamp: &str, prompt: &CinematicPrompt) -> String {
    format!(
        "# CINEMATIC PROMPT - OpenAI API Optimiert\n\
         # Layout: {layout_id}\n\
         # Timestamp: {timestamp}\n\
         # Length: {} characters\n\
         # Transformation Type: {}\n\n\
         ## VISUELLES MOTIV\n{}\n\n\
         ## LAYOUT\n{}\n\n\
         ## STIL\n{}\n\n\
         ## QUALITÄT\n{}\n\n\
         ## NICHT ERWÜNSCHT\n{}\n\n\
         ## VOLLSTÄNDIGER PROMPT\n{}",
        prompt.full_prompt.chars().count(),
        prompt.metadata.transformation_type,
        prompt.visual_description,
        prompt.layout_description,
        prompt.style_description,
        prompt.quality_requirements,
        prompt.negative_prompts,
        prompt.full_prompt,
    )
}

/// Writes the run's files into `dir` (created if missing) and returns their paths
/// in write order: midjourney, dalle, cinematic, report.
pub async fn save_output_files(
    dir: &Path,
    data: &LayoutIntegratedData,
    midjourney_prompt: &str,
    dalle_prompt: &str,
    cinematic: &CinematicPrompt,
) -> Result<Vec<PathBuf>, PipelineError> {
    tokio::fs::create_dir_all(dir).await?;

    let input = &data.structured_input;
    let layout_id = input.layout_id.as_str();
    let timestamp = input.timestamp.as_str();
    let stem = format!("{}_{timestamp}", file_token(layout_id));

    let files = [
        (
            format!("midjourney_multiprompt_{stem}.txt"),
            midjourney_file(layout_id, timestamp, midjourney_prompt),
        ),
        (
            format!("dalle_multiprompt_{stem}.txt"),
            dalle_file(layout_id, timestamp, dalle_prompt),
        ),
        (
            format!("cinematic_prompt_{stem}.txt"),
            cinematic_file(layout_id, timestamp, cinematic),
        ),
    ];

    let mut written = Vec::with_capacity(files.len() + 1);
    for (name, contents) in files {
        let path = dir.join(name);
        tokio::fs::write(&path, contents).await?;
        written.push(path);
    }

    let dalle_length = dalle_prompt.chars().count();
    let report = RunReport {
        timestamp,
        layout_id,
        layout_name: data.layout_name(),
        processing_stages: ProcessingStages {
            input_processed: true,
            layout_integrated: true,
            prompts_finalized: true,
        },
        text_placements_count: data.text_placements.len(),
        adaptive_adjustments_count: data.adaptive_adjustments.len(),
        layout_metrics: &data.layout_metrics,
        prompts: ReportPrompts {
            midjourney: PromptPreview {
                length: midjourney_prompt.chars().count(),
                compatible: None,
                transformation_type: None,
                preview: preview(midjourney_prompt),
            },
            dalle: PromptPreview {
                length: dalle_length,
                compatible: Some(dalle_length <= DALLE_MAX_PROMPT_CHARS),
                transformation_type: None,
                preview: preview(dalle_prompt),
            },
            cinematic: PromptPreview {
                length: cinematic.full_prompt.chars().count(),
                compatible: None,
                transformation_type: Some(cinematic.metadata.transformation_type.clone()),
                preview: preview(&cinematic.full_prompt),
            },
        },
    };

    let report_path = dir.join(format!("multiprompt_report_{stem}.json"));
    tokio::fs::write(&report_path, serde_json::to_vec_pretty(&report)?).await?;
    written.push(report_path);

    info!(count = written.len(), dir = %dir.display(), "Output files saved");
    Ok(written)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::LayoutCatalog;
    use crate::pipeline::cinematic::{transform, QualityLevel};
    use crate::pipeline::input::{process_input, RawCreativeInput};
    use crate::pipeline::integrator::integrate;

    #[test]
    fn test_preview_counts_chars() {
        assert_eq!(preview(&"ä".repeat(150)), format!("{}...", "ä".repeat(100)));
        assert_eq!(preview("kurz"), "kurz...");
    }

    #[test]
    fn test_file_token_replaces_path_characters() {
        assert_eq!(file_token("skizze1_vertical_split"), "skizze1_vertical_split");
        assert_eq!(file_token("a/b"), "a_b");
        assert_eq!(file_token("../etc\\passwd"), "___etc_passwd");
        assert_eq!(file_token("größe-1"), "gr__e-1");
    }

    #[test]
    fn test_dalle_header_flags_compatibility() {
        let ok = dalle_file("skizze1_vertical_split", "20260101_120000", "prompt");
        assert!(ok.contains("# Compatible: Yes\n\nprompt"));
        let long = dalle_file("x", "t", &"a".repeat(4001));
        assert!(long.contains("# Length: 4001 characters\n# Compatible: No"));
    }

    #[tokio::test]
    async fn test_save_output_files_writes_four_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = process_input(RawCreativeInput {
            headline: Some("Pflege mit Herz".to_string()),
            ..Default::default()
        });
        let data = integrate(&LayoutCatalog::default(), input).unwrap();
        let cinematic = transform(&data, false, QualityLevel::High);

        let out = dir.path().join("outputs");
        let files = save_output_files(&out, &data, "mj prompt", "dalle prompt", &cinematic)
            .await
            .unwrap();

        assert_eq!(files.len(), 4);
        let ts = &data.structured_input.timestamp;
        assert_eq!(
            files[0].file_name().unwrap().to_string_lossy(),
            format!("midjourney_multiprompt_skizze1_vertical_split_{ts}.txt")
        );

        let report: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&files[3]).unwrap()).unwrap();
        assert_eq!(report["layout_id"], "skizze1_vertical_split");
        assert_eq!(report["processing_stages"]["prompts_finalized"], true);
        assert_eq!(report["prompts"]["dalle"]["compatible"], true);
        assert_eq!(report["prompts"]["midjourney"]["preview"], "mj prompt...");
        assert_eq!(report["prompts"]["cinematic"]["transformation_type"], "cinematic");

        let cinematic_text = std::fs::read_to_string(&files[2]).unwrap();
        assert!(cinematic_text.starts_with("# CINEMATIC PROMPT - OpenAI API Optimiert\n"));
        assert!(cinematic_text.contains("## VOLLSTÄNDIGER PROMPT\n"));
    }
}
