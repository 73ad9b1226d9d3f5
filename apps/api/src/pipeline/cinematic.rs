//! Cinematic prompt: paragraph-style German prose for the image API.
//!
//! Rendered from the same `LayoutIntegratedData` as the structured prompts but
//! without coordinates or bullet structure.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pipeline::colors::cinematic_color_description;
use crate::pipeline::input::{StructuredInput, TextContainers};
use crate::pipeline::integrator::{LayoutIntegratedData, PlacementContent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Basic,
    #[default]
    High,
    Premium,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Basic => "basic",
            QualityLevel::High => "high",
            QualityLevel::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionLengths {
    pub visual: usize,
    pub layout: usize,
    pub style: usize,
    pub quality: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CinematicMetadata {
    pub transformation_type: String,
    pub original_layout: String,
    pub text_rendering: bool,
    pub quality_level: QualityLevel,
    pub prompt_length: usize,
    pub sections: SectionLengths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CinematicPrompt {
    pub visual_description: String,
    pub layout_description: String,
    pub style_description: String,
    pub quality_requirements: String,
    pub negative_prompts: String,
    pub full_prompt: String,
    pub metadata: CinematicMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationStats {
    pub original_length: usize,
    pub cinematic_length: usize,
    /// One decimal; 0 when the original prompt is empty.
    pub reduction_percentage: f64,
    pub transformation_type: String,
}

struct LayoutVisual {
    description: &'static str,
    visual_style: &'static str,
    composition: &'static str,
}

const DEFAULT_LAYOUT_VISUAL: LayoutVisual = LayoutVisual {
    description: "professionelles Layout",
    visual_style: "moderne Gestaltung",
    composition: "ausgewogene Komposition",
};

fn layout_visual(layout_id: &str) -> LayoutVisual {
    match layout_id {
        "skizze11_dynamic_layout" => LayoutVisual {
            description: "dynamisches Layout mit diagonaler Komposition",
            visual_style: "modern und energetisch",
            composition: "diagonale Aufteilung mit dynamischen Elementen",
        },
        "skizze13_text_motiv_split_cta" => LayoutVisual {
            description: "klassisches Split-Layout mit Text und Motiv",
            visual_style: "professionell und ausgewogen",
            composition: "vertikale Aufteilung mit klaren Bereichen",
        },
        "skizze14_hero_layout" => LayoutVisual {
            description: "Hero-Layout mit großem Motiv und Text-Overlay",
            visual_style: "dramatisch und eindrucksvoll",
            composition: "zentrales Motiv mit überlagertem Text",
        },
        _ => DEFAULT_LAYOUT_VISUAL,
    }
}

const HUMAN_QUALITY: [&str; 11] = [
    "Ein echter, authentischer Mensch mit natürlichen Gesichtszügen",
    "realistische Hauttextur und natürliche Gesichtsausdrücke",
    "professionelle, aber warme Ausstrahlung",
    "authentische Arbeitskleidung und natürliche Körperhaltung",
    "KEIN Stock-Foto oder generische Darstellung",
    "echte, ungeschönte Gesichtszüge wie von einem echten Foto",
    "natürliche Falten und Hautdetails",
    "🚨 WICHTIG: Echte, authentische Person, kein generisches Stock-Foto",
    "🚨 WICHTIG: Natürliche, ungeschönte Darstellung wie ein echtes Foto",
    "🚨 WICHTIG: Verwende echte, ungeschönte Gesichtszüge mit natürlichen Details",
    "🚨 WICHTIG: Keine perfekten, glatten Gesichter wie aus der Werbung",
];

const NEGATIVES: [&str; 11] = [
    "Vermeide unscharfe oder niedrigauflösende Elemente",
    "keine generischen Stock-Foto Erscheinung",
    "keine verzerrten Gesichter oder unnatürliche Proportionen",
    "keine künstlich wirkenden oder generischen Gesichter",
    "keine übermäßig bearbeiteten oder unnatürlichen Hauttexturen",
    "keine cartoonartigen oder stilisierten Darstellungen",
    "keine übermäßig gestellten oder unnatürlichen Posen",
    "keine englischen Texte oder Begriffe",
    "keine perfekten, glatten Gesichter wie aus der Werbung",
    "keine generischen Business-Porträts",
    "keine übermäßig gestylten oder bearbeiteten Darstellungen",
];

const QUALITY_PHOTO: &str = "Das Bild soll in höchster Fotografie-Qualität sein mit 8K-Auflösung und professioneller Beleuchtung. ";
const QUALITY_PEOPLE: &str = "Es soll echte, authentische Menschen mit natürlichen Gesichtsausdrücken und realistischer Hauttextur zeigen. ";
const QUALITY_REALISM: &str = "Die Darstellung soll fotorealistisch sein mit natürlichen Schatten, realistischen Materialien und professioneller Komposition. ";
const QUALITY_LIGHTING: &str = "Verwende natürliche Beleuchtung, realistische Farben und authentische Arbeitsumgebungen. ";
const QUALITY_CORPORATE: &str = "Das Creative soll Corporate-Standard-Qualität haben und für professionelle Recruiting-Kampagnen geeignet sein.";

pub fn transform(
    data: &LayoutIntegratedData,
    enable_text_rendering: bool,
    quality_level: QualityLevel,
) -> CinematicPrompt {
    let input = &data.structured_input;

    let visual_description = visual_description(data);
    let layout_description = layout_description(data, enable_text_rendering);
    let style_description = style_description(input);
    let quality_requirements = quality_requirements(quality_level);
    let negative_prompts = negative_prompts(enable_text_rendering);

    let full_prompt = assemble(
        &visual_description,
        &layout_description,
        &style_description,
        &quality_requirements,
        &negative_prompts,
    );

    let metadata = CinematicMetadata {
        transformation_type: "cinematic".to_string(),
        original_layout: data
            .layout_definition
            .name
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        text_rendering: enable_text_rendering,
        quality_level,
        prompt_length: full_prompt.chars().count(),
        sections: SectionLengths {
            visual: visual_description.chars().count(),
            layout: layout_description.chars().count(),
            style: style_description.chars().count(),
            quality: quality_requirements.chars().count(),
            negative: negative_prompts.chars().count(),
        },
    };

    info!(length = metadata.prompt_length, "Cinematic prompt transformed");

    CinematicPrompt {
        visual_description,
        layout_description,
        style_description,
        quality_requirements,
        negative_prompts,
        full_prompt,
        metadata,
    }
}

pub fn transformation_stats(original: &str, cinematic: &str) -> TransformationStats {
    let original_length = original.chars().count();
    let cinematic_length = cinematic.chars().count();
    let reduction_percentage = if original_length == 0 {
        0.0
    } else {
        let raw = (1.0 - cinematic_length as f64 / original_length as f64) * 100.0;
        (raw * 10.0).round() / 10.0
    };

    TransformationStats {
        original_length,
        cinematic_length,
        reduction_percentage,
        transformation_type: "structured_to_cinematic".to_string(),
    }
}

fn visual_description(data: &LayoutIntegratedData) -> String {
    let input = &data.structured_input;

    let mut parts = vec![
        data.motiv_treatment.enhanced_description.clone(),
        HUMAN_QUALITY.join(", "),
        "WICHTIG: Alle Texte und Beschreibungen müssen auf Deutsch sein!".to_string(),
    ];

    let mut context = Vec::new();
    if !input.position_long.is_empty() {
        context.push(format!("Die Person arbeitet als {}", input.position_long));
    }
    if !input.company.is_empty() && !input.location.is_empty() {
        context.push(format!("bei {} in {}", input.company, input.location));
    }
    if !context.is_empty() {
        parts.push(format!("Kontext: {}", context.join(" ")));
    }

    let details: Vec<String> = [
        ("Darstellung", &input.visual_style),
        ("Beleuchtung", &input.lighting_type),
        ("Komposition", &input.framing),
        ("Stimmung", &input.lighting_mood),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("{label}: {value}"))
    .collect();
    if !details.is_empty() {
        parts.push(format!("Technische Details: {}", details.join(", ")));
    }

    parts.join(" ")
}

fn layout_description(data: &LayoutIntegratedData, rendered: bool) -> String {
    let input = &data.structured_input;
    let visual = layout_visual(&data.layout_id);

    let mut parts = vec![
        format!("Das Creative verwendet ein {}", visual.description),
        format!("mit {}", visual.composition),
        format!("in {} Gestaltung", visual.visual_style),
        "🚨 WICHTIG: Das Layout muss exakt wie beschrieben umgesetzt werden!".to_string(),
    ];

    if !data.text_placements.is_empty() {
        let accent = cinematic_color_description(&input.ci_colors.accent);
        let text = |element: &str| match data.placement(element).map(|p| &p.content) {
            Some(PlacementContent::Text(text)) if !text.is_empty() => Some(text.clone()),
            _ => None,
        };
        let mut areas = Vec::new();

        let labelled = [
            ("headline", "einer prominenten Headline", "einem prominenten Headline-Bereich"),
            ("subline", "einer unterstützenden Subline", "einem unterstützenden Subline-Bereich"),
            ("company", "dem Unternehmensnamen", "dem Unternehmensbereich"),
            ("stellentitel", "dem Stellentitel", "dem Stellentitel-Bereich"),
        ];
        for (element, with_text, area_only) in labelled {
            if let Some(content) = text(element) {
                areas.push(if rendered {
                    format!("{with_text} \"{content}\"")
                } else {
                    area_only.to_string()
                });
            }
        }

        if let Some(PlacementContent::List(benefits)) = data.placement("benefits").map(|p| &p.content) {
            if !benefits.is_empty() {
                areas.push(if rendered {
                    let quoted: Vec<String> =
                        benefits.iter().take(3).map(|b| format!("\"{b}\"")).collect();
                    format!("den Benefits {}", quoted.join(", "))
                } else {
                    "den Benefits-Bereichen".to_string()
                });
            }
        }

        if let Some(cta) = text("cta") {
            areas.push(if rendered {
                format!("einem Call-to-Action Button \"{cta}\" in {accent}")
            } else {
                format!("einem Call-to-Action Button in {accent}")
            });
        }

        if !input.location.is_empty() {
            areas.push(if rendered {
                format!(
                    "einem prominenten Standort-Banner \"📍 {}\" in {accent} mit Pin-Symbol",
                    input.location
                )
            } else {
                format!("einem prominenten Standort-Banner mit Pin-Symbol in {accent}")
            });
        }

        if !areas.is_empty() {
            parts.push(format!("mit {}", areas.join(", ")));
        }
    }

    format!("{}.", parts.join(" "))
}

fn style_description(input: &StructuredInput) -> String {
    let colors = &input.ci_colors;
    let mut parts = vec![
        format!(
            "Das Corporate Design verwendet {} als Hauptfarbe",
            cinematic_color_description(&colors.primary)
        ),
        format!(
            "mit {} als unterstützende Farbe",
            cinematic_color_description(&colors.secondary)
        ),
        format!(
            "und {} für Akzente und Call-to-Actions",
            cinematic_color_description(&colors.accent)
        ),
    ];

    let containers = input
        .style_options
        .text_containers
        .as_ref()
        .filter(|c| **c != TextContainers::default());
    if let Some(containers) = containers {
        match containers.shape.as_deref().unwrap_or("rounded_rectangle") {
            "rounded_rectangle" => parts.push("mit abgerundeten Text-Containern".to_string()),
            "rectangle" => parts.push("mit rechteckigen Text-Containern".to_string()),
            "circle" => parts.push("mit kreisrunden Text-Containern".to_string()),
            _ => {}
        }
    }

    parts.push("Das Design ist professionell und modern gestaltet".to_string());
    parts.push("mit klaren visuellen Hierarchien und guter Lesbarkeit".to_string());

    format!("{}.", parts.join(" "))
}

fn quality_requirements(level: QualityLevel) -> String {
    match level {
        QualityLevel::Premium => [
            QUALITY_PHOTO,
            QUALITY_PEOPLE,
            QUALITY_REALISM,
            QUALITY_LIGHTING,
            QUALITY_CORPORATE,
            " Hochwertige Texturen, detaillierte Gesichtszüge und professionelle Fotografie-Qualität.",
        ]
        .concat(),
        QualityLevel::High => [
            QUALITY_PHOTO,
            QUALITY_PEOPLE,
            QUALITY_REALISM,
            QUALITY_CORPORATE,
            " ",
            QUALITY_LIGHTING,
            "Alle Texte müssen auf Deutsch sein und korrekt geschrieben werden. ",
            "Verwende echte, ungeschönte Gesichtszüge statt perfekter Stock-Foto Darstellungen.",
        ]
        .concat(),
        QualityLevel::Basic => [
            "Das Bild soll in professioneller Fotografie-Qualität sein. ",
            "Es soll authentische Arbeitsplatz-Szenarien zeigen mit natürlichen Gesichtsausdrücken. ",
            QUALITY_CORPORATE,
        ]
        .concat(),
    }
}

fn negative_prompts(rendered: bool) -> String {
    let closing = if rendered {
        "Text soll klar und lesbar sein"
    } else {
        "alle Layout-Bereiche müssen als sichtbare Farbflächen erscheinen"
    };
    let parts: Vec<&str> = NEGATIVES.iter().copied().chain([closing]).collect();
    format!("{}.", parts.join(" "))
}

fn assemble(visual: &str, layout: &str, style: &str, quality: &str, negative: &str) -> String {
    [
        "Ein professionelles Recruiting-Creative für Social Media in höchster Fotografie-Qualität mit folgender Gestaltung:".to_string(),
        String::new(),
        "🚨 WICHTIG: Alle Texte und Beschreibungen MÜSSEN auf Deutsch sein!".to_string(),
        "🚨 WICHTIG: Keine englischen Begriffe verwenden!".to_string(),
        "🚨 WICHTIG: Alle Headlines, Benefits und CTAs müssen auf Deutsch sein!".to_string(),
        "🚨 WICHTIG: Verwende NUR deutsche Sprache, keine englischen Texte!".to_string(),
        "🚨 WICHTIG: Alle Schriftzüge und Beschriftungen müssen auf Deutsch sein!".to_string(),
        "🚨 WICHTIG: DALL-E soll deutsche Texte korrekt rendern, keine englischen Wörter!".to_string(),
        String::new(),
        format!("VISUELLES MOTIV: {visual}"),
        String::new(),
        format!("LAYOUT: {layout}"),
        String::new(),
        format!("STIL: {style}"),
        String::new(),
        format!("QUALITÄT: {quality}"),
        String::new(),
        format!("NICHT ERWÜNSCHT: {negative}"),
        String::new(),
        "STYLE: fotorealistisch, professionelle Fotografie, natürliche Beleuchtung, authentische Darstellung".to_string(),
        String::new(),
        "SPRACHE: Alle Texte und Beschreibungen MÜSSEN auf Deutsch sein, keine englischen Begriffe verwenden!".to_string(),
        "SPRACHE: Headlines, Benefits und Call-to-Actions MÜSSEN auf Deutsch sein!".to_string(),
        "SPRACHE: Verwende ausschließlich deutsche Sprache für alle Textelemente!".to_string(),
        "SPRACHE: DALL-E soll deutsche Wörter korrekt schreiben, keine englischen Texte rendern!".to_string(),
        "SPRACHE: Verwende deutsche Umlaute (ä, ö, ü) und korrekte deutsche Rechtschreibung!".to_string(),
    ]
    .join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalog::LayoutCatalog;
    use crate::pipeline::input::{process_input, RawCreativeInput};
    use crate::pipeline::integrator::integrate;

    fn make_data(layout_id: &str) -> LayoutIntegratedData {
        let input = process_input(RawCreativeInput {
            headline: Some("Pflege mit Herz".to_string()),
            company: Some("Klinikum Nord".to_string()),
            location: Some("Hamburg".to_string()),
            position_long: Some("Pflegefachkraft".to_string()),
            benefits: vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()],
            motiv_prompt: Some("Pflegekraft lächelt".to_string()),
            layout_id: Some(layout_id.to_string()),
            ..Default::default()
        });
        integrate(&LayoutCatalog::default(), input).unwrap()
    }

    #[test]
    fn test_layout_mapping_by_resolved_id() {
        let hero = transform(&make_data("skizze14_hero_layout"), false, QualityLevel::High);
        assert!(hero
            .layout_description
            .starts_with("Das Creative verwendet ein Hero-Layout mit großem Motiv und Text-Overlay"));

        let other = transform(&make_data("skizze1_vertical_split"), false, QualityLevel::High);
        assert!(other
            .layout_description
            .starts_with("Das Creative verwendet ein professionelles Layout mit ausgewogene Komposition in moderne Gestaltung Gestaltung"));
    }

    #[test]
    fn test_text_areas_by_mode() {
        let data = make_data("skizze13_text_motiv_split_cta");

        let layout_mode = transform(&data, false, QualityLevel::High);
        assert!(layout_mode.layout_description.contains("einem prominenten Headline-Bereich"));
        assert!(layout_mode.layout_description.contains("einem Call-to-Action Button in lebendigem Gelb"));
        assert!(layout_mode
            .layout_description
            .ends_with("einem prominenten Standort-Banner mit Pin-Symbol in lebendigem Gelb."));

        let rendered = transform(&data, true, QualityLevel::High);
        assert!(rendered.layout_description.contains("einer prominenten Headline \"Pflege mit Herz\""));
        assert!(rendered.layout_description.contains("den Benefits \"A\", \"B\", \"C\","));
        assert!(rendered.layout_description.contains("\"📍 Hamburg\" in lebendigem Gelb mit Pin-Symbol"));
    }

    #[test]
    fn test_visual_context() {
        let prompt = transform(&make_data("skizze1_vertical_split"), false, QualityLevel::High);
        assert!(prompt.visual_description.starts_with("Pflegekraft lächelt."));
        assert!(prompt
            .visual_description
            .contains("Kontext: Die Person arbeitet als Pflegefachkraft bei Klinikum Nord in Hamburg"));
        assert!(prompt.visual_description.contains("Technische Details: Darstellung: "));
    }

    #[test]
    fn test_quality_levels_differ() {
        let basic = quality_requirements(QualityLevel::Basic);
        let high = quality_requirements(QualityLevel::High);
        let premium = quality_requirements(QualityLevel::Premium);
        assert!(basic.starts_with("Das Bild soll in professioneller Fotografie-Qualität sein."));
        assert!(high.ends_with("statt perfekter Stock-Foto Darstellungen."));
        assert!(premium.ends_with("professionelle Fotografie-Qualität."));
        assert!(basic.len() < high.len());
    }

    #[test]
    fn test_metadata_and_sections() {
        let prompt = transform(&make_data("skizze14_hero_layout"), true, QualityLevel::Premium);
        assert_eq!(prompt.metadata.transformation_type, "cinematic");
        assert_eq!(prompt.metadata.original_layout, "Hero Layout");
        assert_eq!(prompt.metadata.quality_level, QualityLevel::Premium);
        assert_eq!(prompt.metadata.prompt_length, prompt.full_prompt.chars().count());
        assert!(prompt.full_prompt.contains("\n\nVISUELLES MOTIV: "));
        assert!(prompt.negative_prompts.ends_with("Text soll klar und lesbar sein."));
    }

    #[test]
    fn test_transformation_stats() {
        let stats = transformation_stats(&"a".repeat(1000), &"b".repeat(667));
        assert_eq!(stats.reduction_percentage, 33.3);
        assert_eq!(stats.transformation_type, "structured_to_cinematic");

        let empty = transformation_stats("", "abc");
        assert_eq!(empty.reduction_percentage, 0.0);
    }
}
