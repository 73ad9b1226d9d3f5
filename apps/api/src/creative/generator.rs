//! Creative generation: optimize the prompt, call the image backend, save a PNG
//! plus a JSON log.
//!
//! Flow: optimize (text optimizer, failures keep the prompt) → shorten if over
//! the DALL-E limit → generate → URL download or base64 decode → PNG → log.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use base64::Engine;
use bytes::Bytes;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::image_client::{GeneratedImage, ImageBackend, ImageError, ImageRequest};
use crate::llm_client::TextOptimizer;
use crate::pipeline::dalle::DALLE_MAX_PROMPT_CHARS;
use crate::pipeline::FinalizedPrompts;

pub const CREATIVES_DIR: &str = "generated_creatives";
const METHOD: &str = "enhanced_creative_generator";

/// Shortened prompts keep priority lines while under this many chars.
const PRIORITY_BUDGET: usize = DALLE_MAX_PROMPT_CHARS - 200;
/// Remaining lines are added while under this many chars.
const FILL_BUDGET: usize = DALLE_MAX_PROMPT_CHARS - 50;

const PRIORITY_KEYWORDS: [&str; 5] = [
    "CANVAS STRUCTURE",
    "MOTIV BESCHREIBUNG",
    "TEXT-LAYOUT",
    "QUALITÄTS-ANFORDERUNGEN",
    "Corporate Design",
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DalleSettings {
    pub model: String,
    pub size: String,
    pub quality: String,
    pub style: String,
    pub n: u32,
}

impl Default for DalleSettings {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
            size: "1792x1024".to_string(),
            quality: "hd".to_string(),
            style: "natural".to_string(),
            n: 1,
        }
    }
}

/// Caller context recorded with each creative. `company` also names the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cinematic_reduction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_quality_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_quality_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts_used: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_strategy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreativeResult {
    pub success: bool,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub revised_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
    pub prompt_used: String,
    pub dalle_settings: DalleSettings,
    pub generation_time: f64,
    pub metadata: CreativeMetadata,
    pub method: String,
}

#[derive(Debug, Serialize)]
struct CreativeLog<'a> {
    timestamp: &'a str,
    method: &'a str,
    success: bool,
    image_path: Option<&'a str>,
    prompt_length: usize,
    generation_time: f64,
    dalle_settings: &'a DalleSettings,
    metadata: &'a CreativeMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revised_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

struct SavedImage {
    path: PathBuf,
    width: u32,
    height: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct CreativeGenerator {
    backend: Arc<dyn ImageBackend>,
    optimizer: Arc<dyn TextOptimizer>,
    output_dir: PathBuf,
    settings: DalleSettings,
}

impl CreativeGenerator {
    /// `output_root` is the service output directory; creatives are written to
    /// its `generated_creatives` subdirectory.
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        optimizer: Arc<dyn TextOptimizer>,
        output_root: &Path,
    ) -> Self {
        Self {
            backend,
            optimizer,
            output_dir: output_root.join(CREATIVES_DIR),
            settings: DalleSettings::default(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Never fails: errors are logged and returned as a `success = false` result.
    pub async fn generate_from_prompt(&self, prompt: &str, metadata: CreativeMetadata) -> CreativeResult {
        let started = Instant::now();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        info!(prompt_len = prompt.chars().count(), %timestamp, "Starting creative generation");

        let prepared = self.prepare_prompt(prompt).await;

        let result = match self.render(&prepared, &timestamp, &metadata).await {
            Ok((image, saved)) => {
                info!(
                    file = %saved.path.display(),
                    width = saved.width,
                    height = saved.height,
                    "Creative generated"
                );
                CreativeResult {
                    success: true,
                    image_path: Some(saved.path.display().to_string()),
                    image_url: image.url,
                    revised_prompt: image.revised_prompt.or_else(|| Some(prepared.clone())),
                    error: None,
                    timestamp: timestamp.clone(),
                    prompt_used: prepared,
                    dalle_settings: self.settings.clone(),
                    generation_time: started.elapsed().as_secs_f64(),
                    metadata,
                    method: METHOD.to_string(),
                }
            }
            Err(e) => {
                error!("Creative generation failed: {e}");
                CreativeResult {
                    success: false,
                    image_path: None,
                    image_url: None,
                    revised_prompt: None,
                    error: Some(e.to_string()),
                    timestamp: timestamp.clone(),
                    prompt_used: prompt.to_string(),
                    dalle_settings: self.settings.clone(),
                    generation_time: started.elapsed().as_secs_f64(),
                    metadata,
                    method: METHOD.to_string(),
                }
            }
        };

        self.save_log(&result).await;
        result
    }

    /// Prefers the cinematic prompt when it is present.
    pub async fn generate_from_finalized(&self, finalized: &FinalizedPrompts) -> CreativeResult {
        let input = &finalized.layout_data.structured_input;
        let cinematic = &finalized.cinematic_prompt.full_prompt;

        let (prompt, prompt_type, cinematic_reduction) = if cinematic.is_empty() {
            (finalized.dalle_prompt.as_str(), "dalle", None)
        } else {
            (
                cinematic.as_str(),
                "cinematic",
                Some(finalized.transformation_stats.reduction_percentage),
            )
        };
        info!(prompt_type, prompt_len = prompt.chars().count(), "Generating creative from pipeline result");

        let metadata = CreativeMetadata {
            company: Some(input.company.clone()).filter(|c| !c.is_empty()),
            headline: Some(input.headline.clone()),
            layout_id: Some(input.layout_id.clone()),
            timestamp: Some(input.timestamp.clone()),
            quality_score: Some(finalized.quality_assessment.overall_score),
            source: Some("multi_prompt_system".to_string()),
            prompt_type: Some(prompt_type.to_string()),
            cinematic_reduction,
            ..Default::default()
        };

        self.generate_from_prompt(prompt, metadata).await
    }

    /// Paths of saved creatives, newest first.
    pub async fn recent_creatives(&self, limit: usize) -> Vec<String> {
        match list_creatives(&self.output_dir).await {
            Ok(mut files) => {
                files.sort_by(|a, b| b.1.cmp(&a.1));
                files
                    .into_iter()
                    .take(limit)
                    .map(|(path, _)| path.display().to_string())
                    .collect()
            }
            Err(e) => {
                // A missing directory just means nothing was generated yet.
                if e.kind() != std::io::ErrorKind::NotFound {
                    error!("Listing creatives failed: {e}");
                }
                Vec::new()
            }
        }
    }

    async fn prepare_prompt(&self, prompt: &str) -> String {
        let optimized = match self.optimizer.optimize(prompt, None).await {
            Ok(optimized) => {
                info!(
                    before = prompt.chars().count(),
                    after = optimized.chars().count(),
                    "Prompt optimized"
                );
                optimized
            }
            Err(e) => {
                warn!("Prompt optimization skipped: {e}");
                prompt.to_string()
            }
        };

        if optimized.chars().count() <= DALLE_MAX_PROMPT_CHARS {
            return optimized;
        }
        let shortened = shorten_prompt(&optimized);
        warn!(
            before = optimized.chars().count(),
            after = shortened.chars().count(),
            "Prompt over the DALL-E limit, shortened"
        );
        shortened
    }

    async fn render(
        &self,
        prompt: &str,
        timestamp: &str,
        metadata: &CreativeMetadata,
    ) -> Result<(GeneratedImage, SavedImage), ImageError> {
        let request = ImageRequest {
            model: self.settings.model.clone(),
            prompt: prompt.to_string(),
            size: self.settings.size.clone(),
            quality: self.settings.quality.clone(),
            style: Some(self.settings.style.clone()),
            n: self.settings.n,
        };
        let image = self.backend.generate(&request).await?;
        let bytes = image_bytes(self.backend.as_ref(), &image).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self
            .output_dir
            .join(creative_file_name(metadata.company.as_deref(), timestamp));
        let saved = save_png(bytes, path).await?;
        Ok((image, saved))
    }

    async fn save_log(&self, result: &CreativeResult) {
        let file_exists = match &result.image_path {
            Some(path) if result.success => Some(tokio::fs::try_exists(path).await.unwrap_or(false)),
            _ => None,
        };
        let log = CreativeLog {
            timestamp: &result.timestamp,
            method: &result.method,
            success: result.success,
            image_path: result.image_path.as_deref(),
            prompt_length: result.prompt_used.chars().count(),
            generation_time: result.generation_time,
            dalle_settings: &result.dalle_settings,
            metadata: &result.metadata,
            image_url: result.image_url.as_deref(),
            revised_prompt: result.revised_prompt.as_deref(),
            file_exists,
            error: result.error.as_deref(),
        };

        let path = self
            .output_dir
            .join(format!("enhanced_creative_log_{}.json", result.timestamp));
        let write = async {
            tokio::fs::create_dir_all(&self.output_dir).await?;
            let json = serde_json::to_vec_pretty(&log).map_err(std::io::Error::other)?;
            tokio::fs::write(&path, json).await
        };
        if let Err(e) = write.await {
            warn!("Creative log not saved: {e}");
        }
    }
}

/// Keeps priority lines first, then fills with the remaining non-empty lines
/// until the fill budget is reached.
pub fn shorten_prompt(prompt: &str) -> String {
    let sections: Vec<&str> = prompt.split('\n').collect();
    let mut kept: Vec<&str> = Vec::new();
    let mut length = 0;

    for section in &sections {
        if PRIORITY_KEYWORDS.iter().any(|k| section.contains(k)) {
            let added = section.chars().count() + 1;
            if length + added < PRIORITY_BUDGET {
                kept.push(section);
                length += added;
            }
        }
    }

    for section in &sections {
        if kept.contains(section) || section.trim().is_empty() {
            continue;
        }
        let added = section.chars().count() + 1;
        if length + added < FILL_BUDGET {
            kept.push(section);
            length += added;
        } else {
            break;
        }
    }

    kept.join("\n")
}

/// `enhanced_creative_{company}_{ts}.png` with the company reduced to
/// alphanumerics, `_` and `-`, at most 20 chars.
pub fn creative_file_name(company: Option<&str>, timestamp: &str) -> String {
    let Some(company) = company else {
        return format!("enhanced_creative_{timestamp}.png");
    };

    // A company that sanitizes to nothing still keeps its slot: `enhanced_creative__{ts}`.
    let safe: String = company
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
        .chars()
        .take(20)
        .collect();
    format!("enhanced_creative_{safe}_{timestamp}.png")
}

pub(crate) async fn image_bytes(
    backend: &dyn ImageBackend,
    image: &GeneratedImage,
) -> Result<Bytes, ImageError> {
    if let Some(url) = &image.url {
        backend.download(url).await
    } else if let Some(b64) = &image.b64_json {
        Ok(Bytes::from(base64::engine::general_purpose::STANDARD.decode(b64)?))
    } else {
        Err(ImageError::EmptyResponse)
    }
}

/// Decodes and re-encodes as PNG on the blocking pool.
async fn save_png(bytes: Bytes, path: PathBuf) -> Result<SavedImage, ImageError> {
    tokio::task::spawn_blocking(move || -> Result<SavedImage, ImageError> {
        let image = image::load_from_memory(&bytes)?;
        image.save_with_format(&path, image::ImageFormat::Png)?;
        Ok(SavedImage {
            width: image.width(),
            height: image.height(),
            path,
        })
    })
    .await?
}

async fn list_creatives(dir: &Path) -> std::io::Result<Vec<(PathBuf, SystemTime)>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("enhanced_creative_") && name.ends_with(".png") {
            let modified = entry.metadata().await?.modified()?;
            files.push((entry.path(), modified));
        }
    }
    Ok(files)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;

    /// 2x1 PNG encoded in memory.
    pub(crate) fn png_bytes() -> Vec<u8> {
        let image = image::RgbImage::from_pixel(2, 1, image::Rgb([0, 94, 165]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    pub(crate) struct FakeBackend {
        pub image: Result<GeneratedImage, String>,
        pub requests: Mutex<Vec<ImageRequest>>,
    }

    impl FakeBackend {
        pub(crate) fn base64() -> Self {
            Self {
                image: Ok(GeneratedImage {
                    url: None,
                    b64_json: Some(base64::engine::general_purpose::STANDARD.encode(png_bytes())),
                    revised_prompt: Some("revised".to_string()),
                }),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                image: Err("boom".to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageBackend for FakeBackend {
        async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, ImageError> {
            self.requests.lock().unwrap().push(request.clone());
            self.image.clone().map_err(|message| ImageError::Api { status: 500, message })
        }

        async fn download(&self, _url: &str) -> Result<Bytes, ImageError> {
            Ok(Bytes::from(png_bytes()))
        }
    }

    pub(crate) struct FakeOptimizer {
        pub reply: Option<String>,
    }

    #[async_trait]
    impl TextOptimizer for FakeOptimizer {
        async fn optimize(&self, _prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            self.reply.clone().ok_or(LlmError::MissingApiKey)
        }
    }

    fn make_generator(backend: Arc<FakeBackend>, reply: Option<&str>, root: &Path) -> CreativeGenerator {
        CreativeGenerator::new(
            backend,
            Arc::new(FakeOptimizer {
                reply: reply.map(str::to_string),
            }),
            root,
        )
    }

    #[test]
    fn test_creative_file_name_sanitizes_company() {
        assert_eq!(
            creative_file_name(Some(" Klinikum Nord & Söhne GmbH Hamburg "), "20260101_120000"),
            "enhanced_creative_Klinikum_Nord__Söhne_20260101_120000.png"
        );
        assert_eq!(
            creative_file_name(None, "20260101_120000"),
            "enhanced_creative_20260101_120000.png"
        );
        assert_eq!(
            creative_file_name(Some("&&"), "20260101_120000"),
            "enhanced_creative__20260101_120000.png"
        );
    }

    #[test]
    fn test_shorten_prompt_keeps_priority_first() {
        let [a, b, c, d] = ["a", "b", "c", "d"].map(|ch| ch.repeat(1000));
        let prompt = format!("{a}\n{b}\n\n— CANVAS STRUCTURE —\n{c}\n{d}\nCorporate Design: blau");
        let shortened = shorten_prompt(&prompt);

        assert!(shortened.starts_with("— CANVAS STRUCTURE —\nCorporate Design: blau\n"));
        assert!(shortened.chars().count() < FILL_BUDGET);
        assert!(shortened.contains(&a) && shortened.contains(&b) && shortened.contains(&c));
        assert!(!shortened.contains(&d), "fill stops at the budget");
    }

    #[tokio::test]
    async fn test_generate_saves_png_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(FakeBackend::base64());
        let generator = make_generator(backend.clone(), Some("optimiert"), dir.path());

        let result = generator
            .generate_from_prompt(
                "prompt",
                CreativeMetadata {
                    company: Some("Klinikum Nord".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.prompt_used, "optimiert");
        assert_eq!(result.revised_prompt.as_deref(), Some("revised"));
        let path = PathBuf::from(result.image_path.unwrap());
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("enhanced_creative_Klinikum_Nord_"));

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].size, "1792x1024");
        assert_eq!(requests[0].quality, "hd");
        assert_eq!(requests[0].style.as_deref(), Some("natural"));

        let log = dir
            .path()
            .join(CREATIVES_DIR)
            .join(format!("enhanced_creative_log_{}.json", result.timestamp));
        let log: serde_json::Value = serde_json::from_slice(&std::fs::read(log).unwrap()).unwrap();
        assert_eq!(log["success"], true);
        assert_eq!(log["file_exists"], true);
    }

    #[tokio::test]
    async fn test_failed_generation_keeps_original_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let generator = make_generator(Arc::new(FakeBackend::failing()), None, dir.path());

        let result = generator.generate_from_prompt("original", CreativeMetadata::default()).await;
        assert!(!result.success);
        assert_eq!(result.prompt_used, "original");
        assert!(result.error.unwrap().contains("boom"));
        assert!(generator.recent_creatives(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_recent_creatives_lists_pngs_only() {
        let dir = tempfile::tempdir().unwrap();
        let generator = make_generator(Arc::new(FakeBackend::base64()), None, dir.path());
        assert!(generator.recent_creatives(5).await.is_empty());

        std::fs::create_dir_all(generator.output_dir()).unwrap();
        std::fs::write(generator.output_dir().join("enhanced_creative_a.png"), b"x").unwrap();
        std::fs::write(generator.output_dir().join("enhanced_creative_log_a.json"), b"{}").unwrap();
        std::fs::write(generator.output_dir().join("other.png"), b"x").unwrap();

        let recent = generator.recent_creatives(5).await;
        assert_eq!(recent.len(), 1);
        assert!(recent[0].ends_with("enhanced_creative_a.png"));
    }
}
