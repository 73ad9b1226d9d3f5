//! Styled image generation: a style template and detail level appended to a
//! cleaned prompt, image data returned in memory.

use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::creative::generator::image_bytes;
use crate::image_client::{ImageBackend, ImageError, ImageRequest};

const MAX_STYLED_PROMPT_CHARS: usize = 1000;
const PARAMETER_FLAGS: [&str; 4] = ["--ar", "--q", "--style", "--no"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub prompt_addition: &'static str,
    pub negative_prompt: &'static str,
}

const REALISTIC: StyleTemplate = StyleTemplate {
    name: "Realistisch",
    description: "Fotorealistische Darstellung",
    prompt_addition: "realistic, photorealistic, high detail",
    negative_prompt: "cartoon, illustration, painting, drawing",
};

/// Unknown keys fall back to `realistisch`.
pub fn style_template(key: &str) -> StyleTemplate {
    match key {
        "künstlerisch" => StyleTemplate {
            name: "Künstlerisch",
            description: "Kreative, künstlerische Darstellung",
            prompt_addition: "artistic, creative, stylized, artistic composition",
            negative_prompt: "photographic, realistic, documentary",
        },
        "fotografisch" => StyleTemplate {
            name: "Fotografisch",
            description: "Professionelle Fotografie",
            prompt_addition: "professional photography, high quality photo, sharp focus",
            negative_prompt: "painting, drawing, illustration, blurry",
        },
        "illustrativ" => StyleTemplate {
            name: "Illustrativ",
            description: "Moderne Illustration",
            prompt_addition: "modern illustration, clean design, vector style",
            negative_prompt: "photography, realistic, 3d render",
        },
        "cinematisch" => StyleTemplate {
            name: "Cinematisch",
            description: "Filmische Darstellung",
            prompt_addition: "cinematic, movie still, dramatic lighting, film grain",
            negative_prompt: "photography, illustration, flat design",
        },
        _ => REALISTIC,
    }
}

/// `(detail, resolution)` per quality level; unknown keys fall back to `standard`.
pub fn quality_detail(key: &str) -> (&'static str, &'static str) {
    match key {
        "hoch" => ("high detail", "high resolution"),
        "sehr_hoch" => ("ultra high detail", "ultra high resolution"),
        _ => ("standard detail", "standard"),
    }
}

pub fn aspect_dimensions(key: &str) -> Option<(u32, u32)> {
    match key {
        "1:1" => Some((1024, 1024)),
        "16:9" => Some((1792, 1024)),
        "9:16" => Some((1024, 1792)),
        "4:3" => Some((1365, 1024)),
        "3:4" => Some((1024, 1365)),
        _ => None,
    }
}

/// Strips parameter flags, appends style and detail, caps at 1000 chars + "...".
pub fn styled_prompt(base: &str, style: &StyleTemplate, detail: &str) -> String {
    let clean = PARAMETER_FLAGS
        .iter()
        .fold(base.to_string(), |acc, flag| acc.replace(flag, ""));
    let prompt = format!("{clean}, {}, {detail}", style.prompt_addition);

    if prompt.chars().count() > MAX_STYLED_PROMPT_CHARS {
        let head: String = prompt.chars().take(MAX_STYLED_PROMPT_CHARS).collect();
        format!("{head}...")
    } else {
        prompt
    }
}

fn default_style() -> String {
    "realistisch".to_string()
}

fn default_quality() -> String {
    "standard".to_string()
}

fn default_aspect_ratio() -> String {
    "1:1".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct StyledRequest {
    pub prompt: String,
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_quality")]
    pub quality: String,
    #[serde(default = "default_aspect_ratio")]
    pub aspect_ratio: String,
    #[serde(default = "default_size")]
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyledMetadata {
    pub prompt: String,
    pub style: String,
    pub quality: String,
    pub aspect_ratio: String,
    pub aspect_dimensions: Option<(u32, u32)>,
    pub size: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyledImage {
    pub image_base64: String,
    pub metadata: StyledMetadata,
}

#[derive(Clone)]
pub struct StyledImageGenerator {
    backend: Arc<dyn ImageBackend>,
    model: String,
}

impl StyledImageGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub async fn generate(&self, request: &StyledRequest) -> Result<StyledImage, ImageError> {
        let template = style_template(&request.style);
        let (detail, _) = quality_detail(&request.quality);
        let prompt = styled_prompt(&request.prompt, &template, detail);

        // The images API only knows standard and hd.
        let api_quality = if request.quality == "standard" { "standard" } else { "hd" };

        info!(
            style = template.name,
            quality = %request.quality,
            aspect_ratio = %request.aspect_ratio,
            "Styled image generation"
        );

        let image = self
            .backend
            .generate(&ImageRequest {
                model: self.model.clone(),
                prompt: prompt.clone(),
                size: request.size.clone(),
                quality: api_quality.to_string(),
                style: None,
                n: 1,
            })
            .await?;
        let bytes = image_bytes(self.backend.as_ref(), &image).await?;

        Ok(StyledImage {
            image_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
            metadata: StyledMetadata {
                prompt,
                style: request.style.clone(),
                quality: request.quality.clone(),
                aspect_ratio: request.aspect_ratio.clone(),
                aspect_dimensions: aspect_dimensions(&request.aspect_ratio),
                size: request.size.clone(),
                model: self.model.clone(),
            },
        })
    }
}
