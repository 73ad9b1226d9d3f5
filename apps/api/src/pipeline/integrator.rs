//! Stage 2: Layout integration.
//!
//! Merges a `StructuredInput` with its layout template: CI colors are written into
//! the template, then text placements, motiv treatment, typography, adaptive
//! adjustments and layout metrics are derived from the resolved definition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::pipeline::catalog::{
    FontSizeRule, LayoutCatalog, LayoutDefinition, MotivDescriptionRules, FALLBACK_LAYOUT_ID,
};
use crate::pipeline::colors::{CiColors, CI_COLOR_SLOTS};
use crate::pipeline::input::StructuredInput;
use crate::pipeline::PipelineError;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Text content of a placement. Benefits are a list, everything else a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlacementContent {
    Text(String),
    List(Vec<String>),
}

impl PlacementContent {
    pub fn is_empty(&self) -> bool {
        match self {
            PlacementContent::Text(text) => text.is_empty(),
            PlacementContent::List(items) => items.is_empty(),
        }
    }

    /// Length used for font tier selection. Lists are measured in their
    /// bracketed, quoted rendering.
    pub fn measured_len(&self) -> usize {
        match self {
            PlacementContent::Text(text) => text.chars().count(),
            PlacementContent::List(items) => format!("{items:?}").chars().count(),
        }
    }

    pub fn joined(&self, separator: &str) -> String {
        match self {
            PlacementContent::Text(text) => text.clone(),
            PlacementContent::List(items) => items.join(separator),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPlacement {
    pub element: String,
    pub content: PlacementContent,
    pub target_zone: String,
    pub position: String,
    pub coordinates: String,
    pub font_size: String,
    pub color: String,
    pub weight: String,
    pub max_length: u32,
    pub priority: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotivTreatment {
    pub original_prompt: String,
    pub fill_mode: String,
    pub aspect_ratio: String,
    pub positioning: String,
    pub focal_point: String,
    pub overlay_compatibility: bool,
    pub text_safe_areas: Vec<String>,
    pub contrast_requirements: String,
    pub enhanced_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedTypography {
    pub font_family: String,
    pub base_size: String,
    pub scale_ratio: f64,
    pub hierarchy: BTreeMap<String, String>,
    pub applied_to_layout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveAdjustment {
    pub rule: String,
    pub trigger: String,
    pub action: String,
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    pub layout_complexity: String,
    pub zones_count: usize,
    pub text_elements_count: usize,
    pub benefits_count: usize,
    pub total_content_length: usize,
    pub ci_colors_count: usize,
    pub layout_efficiency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutIntegratedData {
    pub structured_input: StructuredInput,
    /// Id of the layout actually used; differs from `structured_input.layout_id`
    /// when the requested layout was unknown.
    pub layout_id: String,
    pub layout_definition: LayoutDefinition,
    /// False when not even the fallback layout was available.
    pub has_layout_definition: bool,
    pub text_placements: Vec<TextPlacement>,
    pub motiv_treatment: MotivTreatment,
    pub applied_typography: AppliedTypography,
    pub adaptive_adjustments: Vec<AdaptiveAdjustment>,
    pub layout_metrics: LayoutMetrics,
}

impl LayoutIntegratedData {
    pub fn placement(&self, element: &str) -> Option<&TextPlacement> {
        self.text_placements.iter().find(|p| p.element == element)
    }

    pub fn layout_name(&self) -> &str {
        self.layout_definition.name.as_deref().unwrap_or("Unknown")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Integration
// ────────────────────────────────────────────────────────────────────────────

pub fn integrate(
    catalog: &LayoutCatalog,
    input: StructuredInput,
) -> Result<LayoutIntegratedData, PipelineError> {
    let (layout_id, raw) = match catalog.get(&input.layout_id) {
        Some(raw) => (input.layout_id.clone(), Some(raw)),
        None => {
            warn!(
                "Layout '{}' not found, using {FALLBACK_LAYOUT_ID}",
                input.layout_id
            );
            (FALLBACK_LAYOUT_ID.to_string(), catalog.get(FALLBACK_LAYOUT_ID))
        }
    };

    let has_layout_definition = raw.is_some();
    let layout_definition = match raw {
        Some(raw) => {
            let mut resolved = raw.clone();
            convert_banner_colors(&mut resolved);
            resolve_layout_colors(&mut resolved, &input.ci_colors);
            serde_yaml::from_value::<LayoutDefinition>(resolved)?
        }
        None => LayoutDefinition::default(),
    };

    let text_placements = calculate_text_placements(&layout_definition, &input);
    let motiv_treatment = determine_motiv_treatment(&layout_definition, &input);
    let applied_typography = apply_typography(&layout_definition);
    let adaptive_adjustments = apply_adaptive_rules(&layout_definition, &input);
    let layout_metrics = calculate_layout_metrics(&layout_definition, &input);

    info!(
        layout = %layout_id,
        zones = layout_definition.zones.len(),
        placements = text_placements.len(),
        adjustments = adaptive_adjustments.len(),
        "Layout integrated"
    );

    Ok(LayoutIntegratedData {
        structured_input: input,
        layout_id,
        layout_definition,
        has_layout_definition,
        text_placements,
        motiv_treatment,
        applied_typography,
        adaptive_adjustments,
        layout_metrics,
    })
}

fn generic_background(value: &str) -> Option<&'static str> {
    if value.contains("{secondary_color}") {
        Some("professional dark background")
    } else if value.contains("{primary_color}") {
        Some("professional light background")
    } else if value.contains("{accent_color}") {
        Some("highlighted accent area")
    } else {
        None
    }
}

/// Rewrites CI placeholders in `background_color` values into generic
/// descriptions, so banner areas are described rather than colored.
pub fn convert_banner_colors(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map.iter_mut() {
                if key.as_str() == Some("background_color") {
                    if let Value::String(text) = child {
                        if let Some(generic) = generic_background(text) {
                            *text = generic.to_string();
                            continue;
                        }
                    }
                }
                convert_banner_colors(child);
            }
        }
        Value::Sequence(items) => items.iter_mut().for_each(convert_banner_colors),
        Value::String(text) if text.contains("background_color") => {
            *text = text
                .replace("{secondary_color}", "professional dark background")
                .replace("{primary_color}", "professional light background")
                .replace("{accent_color}", "highlighted accent area");
        }
        _ => {}
    }
}

/// Replaces CI placeholders and the template's stock colors with the palette.
/// The stock mapping runs in order, so a replacement can be hit again by a
/// later entry.
pub fn resolve_layout_colors(value: &mut Value, colors: &CiColors) {
    match value {
        Value::Mapping(map) => {
            for (_, child) in map.iter_mut() {
                resolve_layout_colors(child, colors);
            }
        }
        Value::Sequence(items) => {
            for item in items.iter_mut() {
                resolve_layout_colors(item, colors);
            }
        }
        Value::String(text) => *text = resolve_color_text(text, colors),
        _ => {}
    }
}

fn resolve_color_text(text: &str, colors: &CiColors) -> String {
    let mut resolved = text
        .replace("{primary_color}", &colors.primary)
        .replace("{secondary_color}", &colors.secondary)
        .replace("{accent_color}", &colors.accent)
        .replace("{background_color}", &colors.background);

    let stock_colors: [(&str, &str); 10] = [
        ("#000000", &colors.primary),
        ("#333333", &colors.primary),
        ("#777777", &colors.secondary),
        ("#666666", &colors.secondary),
        ("#00B5E2", &colors.primary),
        ("#0088CC", &colors.primary),
        ("#FFC20E", &colors.accent),
        ("#FFB300", &colors.accent),
        ("#EEEEEE", &colors.secondary),
        ("#F5F5F5", &colors.secondary),
    ];

    for (stock, ci) in stock_colors {
        if resolved.contains(stock) {
            resolved = resolved.replace(stock, ci);
            debug!("Stock color replaced: {stock} -> {ci}");
        }
    }

    resolved
}

fn calculate_text_placements(
    layout: &LayoutDefinition,
    input: &StructuredInput,
) -> Vec<TextPlacement> {
    let logo = match &input.logo_file_name {
        Some(file) => format!("[Logo: {file}]"),
        None => input.logo_placeholder.clone(),
    };

    let mut elements = vec![
        ("headline", PlacementContent::Text(input.headline.clone())),
        ("subline", PlacementContent::Text(input.subline.clone())),
        ("company", PlacementContent::Text(input.company.clone())),
        ("stellentitel", PlacementContent::Text(input.stellentitel.clone())),
        ("position", PlacementContent::Text(input.position_long.clone())),
        ("benefits", PlacementContent::List(input.benefits.clone())),
        ("cta", PlacementContent::Text(input.cta.clone())),
        ("logo", PlacementContent::Text(logo)),
    ];
    if !input.location.is_empty() {
        elements.push(("standort", PlacementContent::Text(format!("📍 {}", input.location))));
    }

    elements
        .into_iter()
        .filter(|(_, content)| !content.is_empty())
        .filter_map(|(element, content)| {
            let rule = layout.text_mapping.get(element)?;
            let font_size = select_font_size(rule.font_size.as_ref(), &content);
            Some(TextPlacement {
                element: element.to_string(),
                target_zone: rule.target_zone.clone().unwrap_or_else(|| "default".into()),
                position: rule.position.clone().unwrap_or_else(|| "center".into()),
                coordinates: rule.coordinates.clone().unwrap_or_else(|| "center".into()),
                font_size,
                color: rule.color.clone().unwrap_or_else(|| "#000000".into()),
                weight: rule.weight.clone().unwrap_or_else(|| "regular".into()),
                max_length: rule.max_length.unwrap_or(50),
                priority: rule.priority.unwrap_or(5),
                content,
            })
        })
        .collect()
}

/// Fixed sizes pass through; tiers are chosen by content length (≤20, ≤35, longer).
pub fn select_font_size(rule: Option<&FontSizeRule>, content: &PlacementContent) -> String {
    let (primary, secondary, fallback) = match rule {
        Some(FontSizeRule::Fixed(size)) => return size.clone(),
        Some(FontSizeRule::Tiered {
            primary,
            secondary,
            fallback,
        }) => (primary.as_deref(), secondary.as_deref(), fallback.as_deref()),
        None => (None, None, None),
    };

    match content.measured_len() {
        0..=20 => primary.unwrap_or("42px").to_string(),
        21..=35 => secondary.unwrap_or("36px").to_string(),
        _ => fallback.unwrap_or("30px").to_string(),
    }
}

fn determine_motiv_treatment(layout: &LayoutDefinition, input: &StructuredInput) -> MotivTreatment {
    let motiv = &layout.motiv_integration;
    let text = |value: &Option<String>, default: &str| value.clone().unwrap_or_else(|| default.into());

    MotivTreatment {
        original_prompt: input.motiv_prompt.clone(),
        fill_mode: text(&motiv.fill_mode, "cover"),
        aspect_ratio: text(&motiv.aspect_ratio, "1:1"),
        positioning: text(&motiv.positioning, "center_crop"),
        focal_point: text(&motiv.focal_point, "center"),
        overlay_compatibility: motiv.overlay_compatibility.unwrap_or(false),
        text_safe_areas: motiv.text_safe_areas.clone().unwrap_or_default(),
        contrast_requirements: text(&motiv.contrast_requirements, "medium"),
        enhanced_description: enhance_motiv_description(
            &input.motiv_prompt,
            motiv.motiv_description_integration.as_ref(),
        ),
    }
}

pub fn enhance_motiv_description(original: &str, rules: Option<&MotivDescriptionRules>) -> String {
    let Some(rules) = rules else {
        return original.to_string();
    };

    let enhancements: Vec<String> = [
        ("Komposition", &rules.scene_focus),
        ("Positionierung", &rules.subject_positioning),
        ("Beleuchtung", &rules.lighting_preference),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| format!("{label}: {v}"))
    })
    .collect();

    if enhancements.is_empty() {
        original.to_string()
    } else {
        format!("{original}. {}", enhancements.join(", "))
    }
}

fn apply_typography(layout: &LayoutDefinition) -> AppliedTypography {
    let typography = &layout.typography;
    AppliedTypography {
        font_family: typography
            .font_family
            .clone()
            .unwrap_or_else(|| "Inter, system-ui, sans-serif".into()),
        base_size: typography.base_size.clone().unwrap_or_else(|| "16px".into()),
        scale_ratio: typography.scale_ratio.unwrap_or(1.25),
        hierarchy: typography.hierarchy.clone(),
        applied_to_layout: layout.name.clone().unwrap_or_else(|| "Unknown".into()),
    }
}

/// Reads the threshold from triggers like `"length > 40"` or `"count > 4"`.
fn parse_trigger_threshold(trigger: &str) -> Option<usize> {
    trigger.split("> ").nth(1)?.trim().parse().ok()
}

fn apply_adaptive_rules(layout: &LayoutDefinition, input: &StructuredInput) -> Vec<AdaptiveAdjustment> {
    let mut adjustments = Vec::new();

    let checks = [
        (
            "long_headline",
            "length > 50",
            "reduce_font_size",
            input.headline.chars().count(),
            "Headline zu lang",
        ),
        (
            "many_benefits",
            "count > 5",
            "truncate_with_ellipsis",
            input.benefits.len(),
            "Zu viele Benefits",
        ),
    ];

    for (name, default_trigger, default_action, actual, label) in checks {
        let Some(rule) = layout.adaptive_rules.get(name) else {
            continue;
        };
        let trigger = rule.trigger.as_deref().unwrap_or(default_trigger);
        let Some(threshold) = parse_trigger_threshold(trigger) else {
            warn!("Adaptive rule '{name}' has unreadable trigger '{trigger}', skipped");
            continue;
        };

        if actual > threshold {
            adjustments.push(AdaptiveAdjustment {
                rule: name.to_string(),
                trigger: format!("{label} ({actual} > {threshold})"),
                action: rule.action.clone().unwrap_or_else(|| default_action.into()),
                applied: true,
            });
        }
    }

    adjustments
}

fn calculate_layout_metrics(layout: &LayoutDefinition, input: &StructuredInput) -> LayoutMetrics {
    let zones_count = layout.zones.len();
    let text_elements_count = [&input.headline, &input.company, &input.position_long]
        .iter()
        .filter(|text| !text.is_empty())
        .count();
    let total_content_length = input.headline.chars().count()
        + input.company.chars().count()
        + input.position_long.chars().count()
        + input.benefits.iter().map(|b| b.chars().count()).sum::<usize>();

    let layout_efficiency = match zones_count {
        0..=3 => "high",
        4..=6 => "medium",
        _ => "complex",
    };

    LayoutMetrics {
        layout_complexity: layout.complexity.clone().unwrap_or_else(|| "unknown".into()),
        zones_count,
        text_elements_count,
        benefits_count: input.benefits.len(),
        total_content_length,
        ci_colors_count: CI_COLOR_SLOTS,
        layout_efficiency: layout_efficiency.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::input::{process_input, RawCreativeInput};

    fn make_input(layout_id: &str) -> StructuredInput {
        process_input(RawCreativeInput {
            headline: Some("Pflege mit Herz".to_string()),
            subline: Some("Gemeinsam für unsere Patienten".to_string()),
            company: Some("Klinikum Nord".to_string()),
            location: Some("Hamburg".to_string()),
            stellentitel: Some("Pflegefachkraft (m/w/d)".to_string()),
            benefits: vec!["Faire Bezahlung".to_string(), "Fortbildungen".to_string()],
            motiv_prompt: Some("Pflegekraft im Gespräch mit Patientin".to_string()),
            layout_id: Some(layout_id.to_string()),
            primary_color: Some("#1e40af".to_string()),
            accent_color: Some("#dc2626".to_string()),
            ..Default::default()
        })
    }

    fn make_catalog() -> LayoutCatalog {
        LayoutCatalog::default()
    }

    #[test]
    fn test_unknown_layout_falls_back() {
        let data = integrate(&make_catalog(), make_input("does_not_exist")).unwrap();
        assert_eq!(data.layout_id, FALLBACK_LAYOUT_ID);
        assert_eq!(data.structured_input.layout_id, "does_not_exist");
        assert!(data.has_layout_definition);
    }

    #[test]
    fn test_banner_backgrounds_become_generic() {
        let data = integrate(&make_catalog(), make_input("skizze1_vertical_split")).unwrap();
        let zones = &data.layout_definition.zones;
        let footer = zones.iter().find(|z| z.name == "footer_zone").unwrap();
        assert_eq!(
            footer.background_color.as_deref(),
            Some("professional light background")
        );
        let text_zone = zones.iter().find(|z| z.name == "text_zone").unwrap();
        assert_eq!(text_zone.background_color.as_deref(), Some("#FFFFFF"));
    }

    #[test]
    fn test_stock_colors_replaced_with_ci() {
        let data = integrate(&make_catalog(), make_input("skizze1_vertical_split")).unwrap();
        let headline = data.placement("headline").unwrap();
        assert_eq!(headline.color, "#1e40af", "#000000 maps to primary");
        let cta = data.placement("cta").unwrap();
        assert_eq!(cta.color, "#dc2626", "#FFC20E maps to accent");
        let standort = data.placement("standort").unwrap();
        assert_eq!(standort.color, "#dc2626", "placeholder resolves to accent");
    }

    #[test]
    fn test_stock_mapping_is_sequential() {
        let colors = CiColors {
            primary: "#777777".to_string(),
            ..CiColors::default()
        };
        // #000000 -> primary (#777777) -> secondary
        assert_eq!(resolve_color_text("#000000", &colors), colors.secondary);
    }

    #[test]
    fn test_placements_skip_empty_and_unmapped() {
        let data = integrate(&make_catalog(), make_input("skizze1_vertical_split")).unwrap();
        assert!(data.placement("position").is_none(), "position_long is empty");
        let standort = data.placement("standort").unwrap();
        assert_eq!(standort.content, PlacementContent::Text("📍 Hamburg".to_string()));
        let logo = data.placement("logo").unwrap();
        assert_eq!(logo.content, PlacementContent::Text("[FIRMENLOGO]".to_string()));
    }

    #[test]
    fn test_logo_file_name_used_in_placement() {
        let mut input = make_input("skizze1_vertical_split");
        input.logo_file_name = Some("logo.png".to_string());
        let data = integrate(&make_catalog(), input).unwrap();
        assert_eq!(
            data.placement("logo").unwrap().content,
            PlacementContent::Text("[Logo: logo.png]".to_string())
        );
    }

    #[test]
    fn test_font_size_tiers() {
        let tiered = FontSizeRule::Tiered {
            primary: Some("48px".to_string()),
            secondary: Some("40px".to_string()),
            fallback: None,
        };
        let short = PlacementContent::Text("Kurz".to_string());
        let medium = PlacementContent::Text("a".repeat(30));
        let long = PlacementContent::Text("a".repeat(36));

        assert_eq!(select_font_size(Some(&tiered), &short), "48px");
        assert_eq!(select_font_size(Some(&tiered), &medium), "40px");
        assert_eq!(select_font_size(Some(&tiered), &long), "30px");
        assert_eq!(select_font_size(None, &short), "42px");
        assert_eq!(
            select_font_size(Some(&FontSizeRule::Fixed("18px".to_string())), &long),
            "18px"
        );
    }

    #[test]
    fn test_list_length_uses_rendered_form() {
        let list = PlacementContent::List(vec!["ab".to_string(), "cd".to_string()]);
        // ["ab", "cd"]
        assert_eq!(list.measured_len(), 12);
    }

    #[test]
    fn test_motiv_description_enhanced() {
        let data = integrate(&make_catalog(), make_input("skizze1_vertical_split")).unwrap();
        let enhanced = &data.motiv_treatment.enhanced_description;
        assert!(enhanced.starts_with("Pflegekraft im Gespräch mit Patientin. Komposition: "));
        assert!(enhanced.contains("Positionierung: "));
        assert!(enhanced.contains("Beleuchtung: "));
        assert_eq!(data.motiv_treatment.fill_mode, "contain");
    }

    #[test]
    fn test_motiv_without_rules_unchanged() {
        assert_eq!(enhance_motiv_description("Motiv", None), "Motiv");
        assert_eq!(
            enhance_motiv_description("Motiv", Some(&MotivDescriptionRules::default())),
            "Motiv"
        );
    }

    #[test]
    fn test_adaptive_long_headline() {
        let mut input = make_input("skizze1_vertical_split");
        input.headline = "x".repeat(45);
        let data = integrate(&make_catalog(), input).unwrap();
        assert_eq!(data.adaptive_adjustments.len(), 1);
        let adjustment = &data.adaptive_adjustments[0];
        assert_eq!(adjustment.rule, "long_headline");
        assert_eq!(adjustment.trigger, "Headline zu lang (45 > 40)");
        assert_eq!(adjustment.action, "reduce_font_size");
    }

    #[test]
    fn test_trigger_parsing() {
        assert_eq!(parse_trigger_threshold("length > 40"), Some(40));
        assert_eq!(parse_trigger_threshold("count > 4"), Some(4));
        assert_eq!(parse_trigger_threshold("sometimes"), None);
    }

    #[test]
    fn test_layout_metrics() {
        let data = integrate(&make_catalog(), make_input("skizze3_grid")).unwrap();
        let metrics = &data.layout_metrics;
        assert_eq!(metrics.zones_count, 7);
        assert_eq!(metrics.layout_efficiency, "complex");
        assert_eq!(metrics.text_elements_count, 2);
        assert_eq!(metrics.benefits_count, 2);
        assert_eq!(metrics.ci_colors_count, 5);
        assert_eq!(
            metrics.total_content_length,
            "Pflege mit Herz".len() + "Klinikum Nord".len() + "Faire Bezahlung".len() + "Fortbildungen".len()
        );
    }

    #[test]
    fn test_typography_defaults_for_minimal_layout() {
        let data = integrate(&LayoutCatalog::minimal(), make_input("skizze1_vertical_split")).unwrap();
        let typography = &data.applied_typography;
        assert_eq!(typography.font_family, "Inter, system-ui, sans-serif");
        assert_eq!(typography.scale_ratio, 1.25);
        assert_eq!(typography.applied_to_layout, "Vertikale Teilung");
        assert!(data.text_placements.is_empty());
    }
}
