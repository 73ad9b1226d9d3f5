//! Stage 1: Input processing.
//!
//! Turns raw request fields into a `StructuredInput`: trimmed and length-capped text,
//! defaults for every visual parameter, and a validated CI palette.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pipeline::colors::CiColors;

pub const DEFAULT_LAYOUT_ID: &str = "skizze1_vertical_split";
pub const DEFAULT_CTA: &str = "Jetzt bewerben!";
pub const DEFAULT_LOGO_PLACEHOLDER: &str = "[FIRMENLOGO]";
pub const DEFAULT_VISUAL_STYLE: &str = "professional, realistic photography";
pub const DEFAULT_LIGHTING_TYPE: &str = "natural, soft lighting";
pub const DEFAULT_LIGHTING_MOOD: &str = "warm, welcoming, professional";
pub const DEFAULT_FRAMING: &str = "medium shot, waist up";

const MAX_BENEFITS: usize = 5;
const MAX_BENEFIT_LENGTH: usize = 35;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Where the motiv comes from: a text description or an uploaded reference image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotivSource {
    #[default]
    #[serde(rename = "text", alias = "📝 Text-Beschreibung")]
    Text,
    #[serde(rename = "upload", alias = "🖼️ Eigenes Bild hochladen")]
    Upload,
}

/// A `{type, name}` selection from the design options panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleChoice {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContainers {
    pub shape: Option<String>,
    pub border_style: Option<String>,
    pub texture: Option<String>,
    pub corner_radius: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualEffects {
    pub background_treatment: Option<String>,
    pub accent_elements: Option<String>,
}

/// Design adjustments chosen alongside the layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    pub layout_style: Option<StyleChoice>,
    pub container_shape: Option<StyleChoice>,
    pub border_style: Option<StyleChoice>,
    pub corner_radius: Option<StyleChoice>,
    pub accent_elements: Option<StyleChoice>,
    pub texture_style: Option<StyleChoice>,
    pub background_treatment: Option<StyleChoice>,
    pub text_containers: Option<TextContainers>,
    pub visual_effects: Option<VisualEffects>,
    /// Typography hints and anything else the client sends along.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StyleOptions {
    pub fn is_empty(&self) -> bool {
        *self == StyleOptions::default()
    }
}

/// Raw creative request as sent by a client. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCreativeInput {
    pub headline: Option<String>,
    pub subline: Option<String>,
    #[serde(alias = "unternehmen")]
    pub company: Option<String>,
    pub location: Option<String>,
    pub stellentitel: Option<String>,
    pub position_long: Option<String>,
    pub cta: Option<String>,
    pub benefits: Vec<String>,

    pub motiv_prompt: Option<String>,
    pub visual_style: Option<String>,
    pub lighting_type: Option<String>,
    pub lighting_mood: Option<String>,
    pub framing: Option<String>,
    pub motiv_source: Option<MotivSource>,
    pub uploaded_image_name: Option<String>,

    pub layout_id: Option<String>,
    pub ci_colors_palette: Option<BTreeMap<String, String>>,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub accent_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub corporate_colors: Option<BTreeMap<String, String>>,
    pub style_options: Option<StyleOptions>,

    pub logo_file_name: Option<String>,
    pub logo_placeholder: Option<String>,
}

/// Normalized input handed to the layout integrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredInput {
    pub headline: String,
    pub subline: String,
    pub company: String,
    pub location: String,
    pub stellentitel: String,
    pub position_long: String,
    pub benefits: Vec<String>,
    pub cta: String,

    pub motiv_prompt: String,
    pub visual_style: String,
    pub lighting_type: String,
    pub lighting_mood: String,
    pub framing: String,
    pub motiv_source: MotivSource,
    pub uploaded_image_name: Option<String>,

    pub layout_id: String,
    pub ci_colors: CiColors,
    pub style_options: StyleOptions,

    pub logo_file_name: Option<String>,
    pub logo_placeholder: String,

    /// `%Y%m%d_%H%M%S`, local time. Used in output file names.
    pub timestamp: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Processing
// ────────────────────────────────────────────────────────────────────────────

pub fn process_input(raw: RawCreativeInput) -> StructuredInput {
    process_input_at(raw, Local::now())
}

pub fn process_input_at(raw: RawCreativeInput, now: DateTime<Local>) -> StructuredInput {
    let ci_colors = extract_ci_colors(&raw);
    let text = |value: &Option<String>, max: usize| normalize_text(value.as_deref().unwrap_or(""), max);
    let or_default = |value: &Option<String>, default: &str| {
        value.clone().unwrap_or_else(|| default.to_string())
    };

    let structured = StructuredInput {
        headline: text(&raw.headline, 50),
        subline: text(&raw.subline, 60),
        company: text(&raw.company, 30),
        location: text(&raw.location, 25),
        stellentitel: text(&raw.stellentitel, 50),
        position_long: text(&raw.position_long, 40),
        benefits: normalize_benefits(&raw.benefits, MAX_BENEFITS, MAX_BENEFIT_LENGTH),
        cta: normalize_text(raw.cta.as_deref().unwrap_or(DEFAULT_CTA), 25),

        motiv_prompt: text(&raw.motiv_prompt, 200),
        visual_style: or_default(&raw.visual_style, DEFAULT_VISUAL_STYLE),
        lighting_type: or_default(&raw.lighting_type, DEFAULT_LIGHTING_TYPE),
        lighting_mood: or_default(&raw.lighting_mood, DEFAULT_LIGHTING_MOOD),
        framing: or_default(&raw.framing, DEFAULT_FRAMING),
        motiv_source: raw.motiv_source.unwrap_or_default(),
        uploaded_image_name: raw.uploaded_image_name.clone(),

        layout_id: or_default(&raw.layout_id, DEFAULT_LAYOUT_ID),
        ci_colors,
        style_options: raw.style_options.clone().unwrap_or_default(),

        logo_file_name: raw.logo_file_name.clone().filter(|name| !name.trim().is_empty()),
        logo_placeholder: normalize_text(
            raw.logo_placeholder.as_deref().unwrap_or(DEFAULT_LOGO_PLACEHOLDER),
            30,
        ),

        timestamp: now.format("%Y%m%d_%H%M%S").to_string(),
    };

    if let Some(name) = &structured.uploaded_image_name {
        info!("Reference image uploaded: {name}");
    }
    info!(
        headline_chars = structured.headline.chars().count(),
        benefits = structured.benefits.len(),
        layout = %structured.layout_id,
        "Input processed"
    );

    structured
}

/// Trims `text` and caps it at `max_length` characters, ending in "..." when cut.
pub fn normalize_text(text: &str, max_length: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_length {
        return trimmed.to_string();
    }

    warn!("Text shortened to {max_length} characters");
    let kept: String = trimmed.chars().take(max_length.saturating_sub(3)).collect();
    format!("{kept}...")
}

pub fn normalize_benefits(benefits: &[String], max_items: usize, max_length: usize) -> Vec<String> {
    benefits
        .iter()
        .take(max_items)
        .map(|benefit| normalize_text(benefit, max_length))
        .filter(|benefit| !benefit.is_empty())
        .collect()
}

/// Palette priority: structured palette, then individual color fields,
/// then the legacy `corporate_colors` map, then defaults.
pub fn extract_ci_colors(raw: &RawCreativeInput) -> CiColors {
    if let Some(palette) = &raw.ci_colors_palette {
        return CiColors::from_map(palette);
    }

    let individual: BTreeMap<String, String> = [
        ("primary", &raw.primary_color),
        ("secondary", &raw.secondary_color),
        ("accent", &raw.accent_color),
        ("background", &raw.background_color),
        ("text", &raw.text_color),
    ]
    .into_iter()
    .filter_map(|(slot, value)| value.clone().map(|v| (slot.to_string(), v)))
    .collect();

    if !individual.is_empty() {
        info!("CI colors taken from individual fields: {:?}", individual.keys());
        return CiColors::from_map(&individual);
    }

    if let Some(corporate) = raw.corporate_colors.as_ref().filter(|c| !c.is_empty()) {
        return CiColors::from_map(corporate);
    }

    warn!("No CI colors supplied, using defaults");
    CiColors::default()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::colors::{DEFAULT_ACCENT, DEFAULT_PRIMARY};

    fn make_raw() -> RawCreativeInput {
        RawCreativeInput {
            headline: Some("  Werden Sie Teil unseres Teams!  ".to_string()),
            company: Some("Klinikum München".to_string()),
            location: Some("München".to_string()),
            benefits: vec![
                "Flexible Arbeitszeiten".to_string(),
                "   ".to_string(),
                "Attraktive Vergütung".to_string(),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_text_trims_and_truncates() {
        assert_eq!(normalize_text("  kurz  ", 10), "kurz");
        assert_eq!(normalize_text("abcdefghijkl", 10), "abcdefg...");
        assert_eq!(normalize_text("", 10), "");
    }

    #[test]
    fn test_normalize_text_counts_characters_not_bytes() {
        // 12 chars, several multi-byte
        let text = "Übergrößenär";
        assert_eq!(normalize_text(text, 12), text);
        assert_eq!(normalize_text(text, 8), "Übergr...");
    }

    #[test]
    fn test_benefits_capped_and_empty_dropped() {
        let benefits: Vec<String> = (1..=7).map(|i| format!("Benefit {i}")).collect();
        let normalized = normalize_benefits(&benefits, 5, 35);
        assert_eq!(normalized.len(), 5);
        assert_eq!(normalized[4], "Benefit 5");

        let structured = process_input(make_raw());
        assert_eq!(structured.benefits.len(), 2, "blank benefit should be dropped");
    }

    #[test]
    fn test_defaults_applied() {
        let structured = process_input(RawCreativeInput::default());
        assert_eq!(structured.cta, DEFAULT_CTA);
        assert_eq!(structured.layout_id, DEFAULT_LAYOUT_ID);
        assert_eq!(structured.logo_placeholder, DEFAULT_LOGO_PLACEHOLDER);
        assert_eq!(structured.visual_style, DEFAULT_VISUAL_STYLE);
        assert_eq!(structured.motiv_source, MotivSource::Text);
        assert_eq!(structured.ci_colors, CiColors::default());
        assert_eq!(structured.timestamp.len(), 15, "timestamp format is %Y%m%d_%H%M%S");
    }

    #[test]
    fn test_headline_trimmed() {
        let structured = process_input(make_raw());
        assert_eq!(structured.headline, "Werden Sie Teil unseres Teams!");
    }

    #[test]
    fn test_palette_wins_over_individual_fields() {
        let mut palette = BTreeMap::new();
        palette.insert("primary".to_string(), "#111111".to_string());
        let raw = RawCreativeInput {
            ci_colors_palette: Some(palette),
            primary_color: Some("#222222".to_string()),
            ..Default::default()
        };
        assert_eq!(extract_ci_colors(&raw).primary, "#111111");
    }

    #[test]
    fn test_individual_fields_win_over_corporate_colors() {
        let mut corporate = BTreeMap::new();
        corporate.insert("accent".to_string(), "#dc2626".to_string());
        let raw = RawCreativeInput {
            primary_color: Some("#1e40af".to_string()),
            corporate_colors: Some(corporate),
            ..Default::default()
        };
        let colors = extract_ci_colors(&raw);
        assert_eq!(colors.primary, "#1e40af");
        assert_eq!(colors.accent, DEFAULT_ACCENT, "corporate_colors must be ignored");
    }

    #[test]
    fn test_corporate_colors_used_as_last_resort() {
        let mut corporate = BTreeMap::new();
        corporate.insert("accent".to_string(), "#dc2626".to_string());
        let raw = RawCreativeInput {
            corporate_colors: Some(corporate),
            ..Default::default()
        };
        let colors = extract_ci_colors(&raw);
        assert_eq!(colors.accent, "#dc2626");
        assert_eq!(colors.primary, DEFAULT_PRIMARY);
    }

    #[test]
    fn test_motiv_source_accepts_ui_labels() {
        let raw: RawCreativeInput = serde_json::from_str(
            r#"{"motiv_source": "🖼️ Eigenes Bild hochladen", "unternehmen": "Klinikum"}"#,
        )
        .unwrap();
        assert_eq!(raw.motiv_source, Some(MotivSource::Upload));
        assert_eq!(raw.company.as_deref(), Some("Klinikum"));
    }

    #[test]
    fn test_style_options_emptiness() {
        assert!(StyleOptions::default().is_empty());
        let options = StyleOptions {
            text_containers: Some(TextContainers::default()),
            ..Default::default()
        };
        assert!(!options.is_empty());
    }
}
