//! Structured German DALL-E prompt.
//!
//! Sections are emitted in a fixed order (canvas, style options, zones, text
//! areas, motiv, quality, CI colors, design options, negatives) and the result
//! is passed through `sanitize` and `validate`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::pipeline::colors::hex_to_color_description;
use crate::pipeline::input::{
    MotivSource, StructuredInput, StyleChoice, StyleOptions, TextContainers, VisualEffects,
};
use crate::pipeline::integrator::{LayoutIntegratedData, PlacementContent};

pub const DALLE_MAX_PROMPT_CHARS: usize = 4000;

const ELEMENT_ORDER: [&str; 8] = [
    "headline",
    "subline",
    "company",
    "stellentitel",
    "logo",
    "position",
    "benefits",
    "cta",
];

/// Phrases that would stop the model from rendering text. Lines containing
/// any of them are dropped.
const FORBIDDEN_TEXT_PHRASES: [&str; 7] = [
    "KEIN Text oder Schrift",
    "ohne Text-Inhalt",
    "Buchstaben NICHT rendern",
    "Text wird später als Overlay hinzugefügt",
    "nur Layout-Bereiche",
    "ohne Text",
    "NICHT rendern",
];

const FORBIDDEN_INDICATORS: [&str; 4] =
    ["ohne Text", "NICHT rendern", "KEIN Text", "Buchstaben NICHT rendern"];

const REQUIRED_BLOCKS: [&str; 5] = ["HEADLINE", "SUBLINE", "BENEFITS", "STELLENTITEL", "CTA"];

const STANDARD_CI_COLORS: [&str; 3] = ["#005EA5", "#B4D9F7", "#FFC20E"];

const TEXT_RENDERING_INDICATORS: [&str; 4] = [
    "TEXT-ZONE",
    "Text wird direkt im Bild gerendert",
    "lesbare Schrift",
    "TEXT-CONTENT RENDERING",
];

static FORBIDDEN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = FORBIDDEN_TEXT_PHRASES.iter().map(|p| regex::escape(p)).collect();
    Regex::new(&format!("(?i).*(?:{}).*\n?", alternatives.join("|")))
        .expect("forbidden phrase pattern is valid")
});

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("blank run pattern is valid"));

type Table = &'static [(&'static str, &'static str)];

fn describe(table: Table, key: &str, default: &'static str) -> &'static str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(default)
}

/// Like `describe`, but unknown keys pass through unchanged.
fn translate<'a>(table: Table, key: &'a str) -> &'a str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

const LAYOUT_STYLES: Table = &[
    ("sharp_geometric", "scharfe, eckige Konturen für ein modernes, technisches Aussehen"),
    ("rounded_modern", "sanft abgerundete Ecken für ein freundliches, modernes Design"),
    ("organic_flowing", "organische, fließende Formen für ein natürliches, dynamisches Layout"),
    ("wave_contours", "wellige, geschwungene Konturen für ein spielerisches, kreatives Design"),
    ("hexagonal", "sechseckige Formen für ein futuristisches, technisches Aussehen"),
    ("circular", "kreisförmige und ovale Bereiche für ein harmonisches, ausgewogenes Layout"),
    ("asymmetric", "asymmetrische, unregelmäßige Formen für ein dynamisches, künstlerisches Design"),
    ("minimal_clean", "minimalistische, saubere Linien für ein professionelles, klares Layout"),
];

const CONTAINER_SHAPES: Table = &[
    ("rectangle", "rechteckige, eckige Text-Container"),
    ("rounded_rectangle", "abgerundete, moderne Text-Container"),
    ("circle", "kreisförmige, runde Text-Container"),
    ("hexagon", "sechseckige, geometrische Text-Container"),
    ("organic_blob", "organische, fließende Text-Container"),
];

const BORDER_STYLES: Table = &[
    ("solid", "durchgezogene, klare Rahmen"),
    ("dashed", "gestrichelte, moderne Rahmen"),
    ("dotted", "gepunktete, dezente Rahmen"),
    ("soft_shadow", "weiche Schatten ohne sichtbare Rahmen"),
    ("glow", "leuchtende, glühende Effekte"),
    ("none", "keine sichtbaren Rahmen"),
];

const CORNER_RADII: Table = &[
    ("small", "kleine, subtile Rundung (8px)"),
    ("medium", "mittlere, ausgewogene Rundung (16px)"),
    ("large", "große, freundliche Rundung (24px)"),
    ("xl", "sehr große, weiche Rundung (32px)"),
];

const ACCENT_ELEMENTS: Table = &[
    ("classic", "klassische, traditionelle Akzente"),
    ("modern_minimal", "moderne, minimalistische Akzente"),
    ("playful", "verspielte, kreative Akzente"),
    ("organic", "organische, natürliche Akzente"),
    ("bold", "auffällige, kraftvolle Akzente"),
];

const TEXTURE_STYLES: Table = &[
    ("solid", "einfarbige, flache Oberflächen"),
    ("gradient", "sanfte Farbverläufe und Übergänge"),
    ("pattern", "subtile Muster und Texturen"),
    ("glass_effect", "gläserne, transparente Effekte"),
    ("matte", "mattierte, weiche Oberflächen"),
];

const BACKGROUND_TREATMENTS: Table = &[
    ("solid", "einfarbige, saubere Hintergründe"),
    ("subtle_pattern", "subtile, dezente Muster"),
    ("geometric", "geometrische, strukturierte Hintergründe"),
    ("organic", "organische, natürliche Hintergründe"),
    ("none", "transparente, offene Hintergründe"),
];

const CONTAINER_SHAPE_NAMES: Table = &[
    ("rectangle", "rechteckige"),
    ("rounded_rectangle", "abgerundete rechteckige"),
    ("circle", "kreisrunde"),
    ("hexagon", "sechseckige"),
    ("organic_blob", "organische"),
];

const CONTAINER_BORDERS: Table = &[
    ("solid", "durchgezogene Umrandung"),
    ("dashed", "gestrichelte Umrandung"),
    ("dotted", "gepunktete Umrandung"),
    ("soft_shadow", "weichen Schatten"),
    ("glow", "leuchtenden Schein"),
    ("none", "keine Umrandung"),
];

const CONTAINER_TEXTURES: Table = &[
    ("solid", "einfarbige Füllung"),
    ("gradient", "Verlaufsfüllung"),
    ("pattern", "Muster-Textur"),
    ("glass_effect", "Glas-Effekt"),
    ("matte", "matte Oberfläche"),
];

const CONTAINER_CORNERS: Table = &[
    ("small", "leicht abgerundete Ecken (8px)"),
    ("medium", "mittel abgerundete Ecken (16px)"),
    ("large", "stark abgerundete Ecken (24px)"),
    ("xl", "sehr stark abgerundete Ecken (32px)"),
];

const EFFECT_BACKGROUNDS: Table = &[
    ("solid", "einfarbiger Hintergrund"),
    ("subtle_pattern", "dezentes Hintergrundmuster"),
    ("geometric", "geometrisches Hintergrundmuster"),
    ("organic", "organisches Hintergrundmuster"),
    ("none", "ohne spezielle Hintergrund-Behandlung"),
];

const EFFECT_ACCENTS: Table = &[
    ("classic", "klassische Akzent-Elemente"),
    ("modern_minimal", "moderne minimalistische Akzente"),
    ("playful", "verspielte Akzent-Elemente"),
    ("organic", "organische Akzent-Formen"),
    ("bold", "kräftige Akzent-Elemente"),
];

fn choice_kind<'a>(choice: &'a Option<StyleChoice>, default: &'a str) -> &'a str {
    choice
        .as_ref()
        .and_then(|c| c.kind.as_deref())
        .unwrap_or(default)
}

pub fn generate(data: &LayoutIntegratedData, enable_text_rendering: bool) -> String {
    let input = &data.structured_input;
    let layout = &data.layout_definition;
    let mut sections: Vec<String> = Vec::new();

    sections.push(format!(
        "— CANVAS STRUCTURE: {} —",
        layout.name.as_deref().unwrap_or("Layout")
    ));
    sections.push(format!(
        "Canvas: {}px, {}",
        layout.canvas_size.as_deref().unwrap_or("1080x1080"),
        layout.description
    ));
    sections.push(
        "**LAYOUT-ORIENTIERUNG: Links Textstack, rechts Motiv mit Kreis - rein verbale Orientierung**"
            .into(),
    );

    push_style_lines(&mut sections, &input.style_options);

    for zone in &layout.zones {
        let position = zone.position.as_deref().unwrap_or("");
        let content_type = zone.content_type.as_deref().unwrap_or("");
        let name = zone.name.to_uppercase();
        match zone.background_color.as_deref().filter(|bg| *bg != "transparent") {
            Some(bg) => sections.push(format!("• {name} ({position}): {content_type} in {bg}")),
            None => sections.push(format!("• {name} ({position}): {content_type}")),
        }
        if let Some(description) = zone.description.as_deref().filter(|d| !d.is_empty()) {
            sections.push(format!("  → {description}"));
        }
    }

    if !data.text_placements.is_empty() {
        push_text_sections(&mut sections, data, enable_text_rendering);
    }

    push_motiv_section(&mut sections, data);

    sections.push("\n— QUALITÄTS-ANFORDERUNGEN —".into());
    sections.push("• Bildqualität: Hochauflösend, professionelle Fotografie".into());
    sections.push(
        "• Authentizität: Echte Arbeitsplatz-Szenarien, natürliche Gesichtsausdrücke".into(),
    );
    sections.push("• Corporate Standard: Professionelle Kampagne-Qualität".into());

    let colors = &input.ci_colors;
    let primary_desc = hex_to_color_description(&colors.primary);
    let secondary_desc = hex_to_color_description(&colors.secondary);
    let accent_desc = hex_to_color_description(&colors.accent);
    sections.push(format!(
        "• Corporate Design: Hauptfarbe {primary_desc} ({}), Sekundärfarbe {secondary_desc} ({})",
        colors.primary, colors.secondary
    ));
    sections.push(format!(
        "• Akzentfarbe: {accent_desc} ({}) für CTA-Buttons, Highlights und wichtige Elemente",
        colors.accent
    ));
    sections.push(
        "• Farbharmonie: Professionelle Unternehmensfarben durchgängig in Layout und Design integriert"
            .into(),
    );
    debug!(primary = %primary_desc, secondary = %secondary_desc, accent = %accent_desc, "CI colors described");

    if !input.style_options.is_empty() {
        push_design_options(&mut sections, &input.style_options);
    }

    sections.push("\n— NEGATIVE PROMPTS (VERMEIDEN) —".into());
    sections.push("• KEINE unscharfen oder niedrigauflösenden Elemente".into());
    sections.push("• KEINE generischen Stock-Foto Erscheinung".into());
    sections.push("• KEINE verzerrten Gesichter oder unnatürliche Proportionen".into());
    if enable_text_rendering {
        sections.push("• Text soll klar und lesbar sein".into());
        sections.push("• Alle Texte werden mit professioneller, gut lesbarer Schrift gerendert".into());
    } else {
        sections.push("• Alle Texte werden direkt im Bild gerendert".into());
        sections.push("• Professionelle, gut lesbare Schrift verwenden".into());
    }

    validate(&sanitize(&sections.join("\n")))
}

fn push_style_lines(sections: &mut Vec<String>, options: &StyleOptions) {
    let layout_style = describe(
        LAYOUT_STYLES,
        choice_kind(&options.layout_style, "rounded_modern"),
        "moderne, abgerundete Konturen",
    );
    let layout_style_name = options
        .layout_style
        .as_ref()
        .and_then(|c| c.name.as_deref())
        .unwrap_or("Abgerundet & Modern");

    let container = describe(
        CONTAINER_SHAPES,
        choice_kind(&options.container_shape, "rounded_rectangle"),
        "abgerundete, moderne Text-Container",
    );
    let border = describe(
        BORDER_STYLES,
        choice_kind(&options.border_style, "soft_shadow"),
        "weiche Schatten ohne sichtbare Rahmen",
    );
    let corner = describe(
        CORNER_RADII,
        choice_kind(&options.corner_radius, "medium"),
        "mittlere, ausgewogene Rundung (16px)",
    );
    let accent = describe(
        ACCENT_ELEMENTS,
        choice_kind(&options.accent_elements, "modern_minimal"),
        "moderne, minimalistische Akzente",
    );
    let texture = describe(
        TEXTURE_STYLES,
        choice_kind(&options.texture_style, "gradient"),
        "sanfte Farbverläufe und Übergänge",
    );
    let background = describe(
        BACKGROUND_TREATMENTS,
        choice_kind(&options.background_treatment, "subtle_pattern"),
        "subtile, dezente Muster",
    );

    sections.push(format!("• Layout-Konturen: {layout_style}"));
    sections.push(format!("• Container-Form: {container}"));
    sections.push(format!("• Rahmen-Stil: {border}"));
    sections.push(format!("• Ecken-Rundung: {corner}"));
    sections.push(format!("• Akzent-Stil: {accent}"));
    sections.push(format!("• Layout-Style: {layout_style_name} - {layout_style}"));
    sections.push("• Layout-Orientierung: Links Textstack, rechts Motiv mit Kreis".into());
    sections.push(format!("• Textur-Stil: {texture}"));
    sections.push(format!("• Hintergrund: {background}"));
}

fn push_text_sections(sections: &mut Vec<String>, data: &LayoutIntegratedData, rendered: bool) {
    if rendered {
        sections.push("\n— TEXT-CONTENT RENDERING —".into());
        sections.push(
            "**TEXT-RENDERING AKTIVIERT: Alle Texte sollen als lesbare Schrift im Bild erscheinen**"
                .into(),
        );
        sections.push("**WARNUNG: Deutsche Umlaute könnten als korrupte Zeichen erscheinen**".into());
        sections.push(
            "**ANWEISUNG: Verwende klare, gut lesbare Schriftarten für alle Textelemente:**".into(),
        );
    } else {
        sections.push("\n— TEXT-LAYOUT-BEREICHE —".into());
        sections.push(
            "**LAYOUT-ANWEISUNG: Alle definierten Bereiche müssen als sichtbare Farbflächen im Bild erscheinen**"
                .into(),
        );
        sections.push(
            "**KRITISCH: Text-BEREICHE als deutlich abgegrenzte Layout-Zonen - KEINE Unterbrechungen, KEINE überlappenden Texte**"
                .into(),
        );
        sections.push(
            "**Die folgenden Bereiche sollen als kompakte, zusammenhängende Flächen in den definierten Layout-Bereichen erscheinen:**"
                .into(),
        );
    }

    for element in ELEMENT_ORDER {
        let Some(placement) = data.placement(element) else {
            continue;
        };
        let zone = &placement.target_zone;

        match (&placement.content, rendered) {
            (PlacementContent::List(items), true) => {
                sections.push(format!("• {}-Text in {zone}: LESBARE SCHRIFT", title_case(element)));
                for item in items {
                    sections.push(format!("  → \"{item}\" als gut lesbare Schrift"));
                }
            }
            (PlacementContent::Text(text), true) => {
                sections.push(format!(
                    "• {}-Text in {zone}: \"{text}\" als lesbare Schrift ({})",
                    element.to_uppercase(),
                    placement.font_size
                ));
            }
            (PlacementContent::List(items), false) => {
                let preview: Vec<&str> = items.iter().take(3).map(String::as_str).collect();
                sections.push(format!("• {}-BEREICH in {zone}: TEXT-ZONE", title_case(element)));
                sections.push(format!(
                    "  → Inhalt: {} Bullet-Points, Text: {}",
                    items.len(),
                    preview.join(", ")
                ));
                sections.push(
                    "  → Stil: professionelle, gut lesbare Schrift, weiß auf #005EA5, gleichmäßiger Abstand, gut lesbar"
                        .into(),
                );
                sections.push("  → Text wird direkt im Bild gerendert".into());
            }
            (PlacementContent::Text(text), false) => {
                sections.push(format!("• {}-BEREICH in {zone}: TEXT-ZONE", element.to_uppercase()));
                sections.push(format!("  → Inhalt: \"{text}\""));
                sections.push(
                    "  → Stil: professionelle, gut lesbare Schrift, weiß auf #005EA5, zentriert".into(),
                );
                sections.push("  → Text wird direkt im Bild gerendert".into());
            }
        }
    }

    let input = &data.structured_input;
    let accent = &input.ci_colors.accent;

    if !input.location.is_empty() {
        sections.push(format!(
            "• STANDORT-BEREICH: TEXT-ZONE mit Pin-Symbol und Akzentfarbe {accent}"
        ));
        if rendered {
            sections.push(format!("  → Inhalt: \"📍 {}\"", input.location));
            sections.push(format!("  → Stil: professionelle, gut lesbare Schrift, weiß auf {accent}"));
        } else {
            sections.push("  → Standort-Pin-Symbol (📍) als visuelles Element".into());
            sections.push(format!("  → Akzentfarbe {accent} für Standort-Bereich verwenden"));
            sections.push("  → Text wird direkt im Bild gerendert".into());
        }
    }

    if !input.cta.is_empty() {
        sections.push(format!("• CTA-BUTTON: TEXT-ZONE in Akzentfarbe {accent}"));
        if rendered {
            sections.push(format!("  → Inhalt: \"{}\"", input.cta));
            sections.push(format!("  → Stil: professionelle, gut lesbare Schrift, weiß auf {accent}"));
        } else {
            sections.push("  → Professioneller Button-Stil mit abgerundeten Ecken".into());
            sections.push("  → Text wird direkt im Bild gerendert".into());
        }
    }

    if rendered {
        sections.push(
            "\n**TEXT-UMSETZUNG: Alle Texte als lesbare Schrift in den entsprechenden Zonen rendern**"
                .into(),
        );
    } else {
        sections.push("\n**TEXT-UMSETZUNG: Alle Texte werden direkt im Bild gerendert**".into());
    }
}

fn push_motiv_section(sections: &mut Vec<String>, data: &LayoutIntegratedData) {
    let input: &StructuredInput = &data.structured_input;
    let enhanced = &data.motiv_treatment.enhanced_description;

    sections.push("\n— MOTIV BESCHREIBUNG —".into());
    match input.motiv_source {
        MotivSource::Upload => {
            sections.push(
                "**📎 ANHANG-REFERENZ: Verwende das angehängte Bild als Motiv-Vorlage**".into(),
            );
            sections.push(
                "**ANWEISUNG**: Das im Anhang befindliche Bild soll als visuelle Basis für das Marketing-Creative dienen."
                    .into(),
            );
            if enhanced.trim().is_empty() {
                sections.push("Adaptiere das Referenzbild für professionelle Recruiting-Zwecke.".into());
            } else {
                sections.push(format!("Ergänzende Beschreibung: {enhanced}"));
            }
        }
        MotivSource::Text => sections.push(enhanced.clone()),
    }

    if !input.position_long.is_empty() {
        sections.push(format!("Beruf: {}", input.position_long));
    }
    if !input.company.is_empty() && !input.location.is_empty() {
        sections.push(format!("Arbeitsplatz: {} in {}", input.company, input.location));
    }

    sections.push(format!("Darstellung: {}", input.visual_style));
    sections.push(format!("Beleuchtung: {}", input.lighting_type));
    sections.push(format!("Komposition: {}", input.framing));
    sections.push(format!("Stimmung: {}", input.lighting_mood));
}

fn push_design_options(sections: &mut Vec<String>, options: &StyleOptions) {
    sections.push("\n— DESIGN & STYLE-OPTIONEN —".into());

    if let Some(containers) = options.text_containers.as_ref().filter(|c| **c != TextContainers::default()) {
        let shape = containers.shape.as_deref().unwrap_or("rounded_rectangle");
        let border = containers.border_style.as_deref().unwrap_or("soft_shadow");
        let texture = containers.texture.as_deref().unwrap_or("gradient");
        let corner = containers.corner_radius.as_deref().unwrap_or("medium");

        sections.push(format!(
            "• Text-Container-Form: {} Container",
            translate(CONTAINER_SHAPE_NAMES, shape)
        ));
        sections.push(format!(
            "• Container-Rahmen: {}",
            translate(CONTAINER_BORDERS, border)
        ));
        sections.push(format!(
            "• Container-Textur: {}",
            translate(CONTAINER_TEXTURES, texture)
        ));
        sections.push(format!(
            "• Ecken-Styling: {}",
            translate(CONTAINER_CORNERS, corner)
        ));
    }

    if let Some(effects) = options.visual_effects.as_ref().filter(|e| **e != VisualEffects::default()) {
        let background = effects.background_treatment.as_deref().unwrap_or("subtle_pattern");
        let accent = effects.accent_elements.as_deref().unwrap_or("modern_minimal");

        sections.push(format!(
            "• Hintergrund-Behandlung: {}",
            translate(EFFECT_BACKGROUNDS, background)
        ));
        sections.push(format!("• Akzent-Stil: {}", translate(EFFECT_ACCENTS, accent)));
    }

    sections.push("• WICHTIG: Alle Style-Optionen müssen visuell erkennbar umgesetzt werden".into());
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Drops every line containing a forbidden phrase (case-insensitive),
/// collapses runs of blank lines and trims.
pub fn sanitize(prompt: &str) -> String {
    let without_forbidden = FORBIDDEN_LINE_RE.replace_all(prompt, "");
    let collapsed = BLANK_RUN_RE.replace_all(&without_forbidden, "\n\n");
    collapsed.trim().to_string()
}

/// Logs structural gaps and strips any remaining text-prohibiting substrings.
pub fn validate(prompt: &str) -> String {
    let upper = prompt.to_uppercase();
    let missing: Vec<&str> = REQUIRED_BLOCKS
        .iter()
        .copied()
        .filter(|block| !upper.contains(block))
        .collect();
    if !missing.is_empty() {
        warn!("Layout blocks not present (allowed): {}", missing.join(", "));
    }

    if !STANDARD_CI_COLORS.iter().any(|color| prompt.contains(color)) {
        warn!("No standard CI colors in prompt, layout-specific colors are used");
    }

    if !TEXT_RENDERING_INDICATORS.iter().any(|i| prompt.contains(i)) {
        warn!("No explicit text rendering instructions found");
    }

    let found: Vec<&str> = FORBIDDEN_INDICATORS
        .iter()
        .copied()
        .filter(|indicator| prompt.contains(indicator))
        .collect();
    if found.is_empty() {
        return prompt.to_string();
    }

    warn!("Text prohibitions found and removed: {}", found.join(", "));
    let cleaned = found
        .iter()
        .fold(prompt.to_string(), |text, indicator| text.replace(indicator, ""));
    info!("Prompt validated");
    cleaned
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
