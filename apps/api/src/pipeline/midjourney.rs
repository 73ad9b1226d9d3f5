//! Midjourney-style parameterized prompt.
//!
//! English comma-joined description built section by section (subject, scene,
//! posture, camera, composition, corporate design, text areas, rendering),
//! followed by `--ar`/`--style`/`--q`/`--c` parameters and a `--no` list.

use tracing::debug;

use crate::pipeline::catalog::LayoutDefinition;
use crate::pipeline::colors::hex_to_color_description;
use crate::pipeline::input::{MotivSource, StructuredInput};
use crate::pipeline::integrator::{LayoutIntegratedData, MotivTreatment, PlacementContent};

type Table = &'static [(&'static str, &'static str)];

fn lookup(table: Table, key: &str, default: &'static str) -> &'static str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(default)
}

const EMOTIONS: Table = &[
    ("Professionell", "confident and professional expression"),
    ("Einladend", "warm and welcoming smile"),
    ("Vertrauensvoll", "trustworthy and reliable demeanor"),
    ("Energetisch", "energetic and motivated attitude"),
    ("Beruhigend", "calm and reassuring presence"),
];

const ATMOSPHERES: Table = &[
    ("Professionell", "corporate professional atmosphere"),
    ("Einladend", "welcoming and inclusive workplace culture"),
    ("Vertrauensvoll", "stable and trustworthy business environment"),
    ("Energetisch", "dynamic and innovative workspace vibe"),
    ("Beruhigend", "calm and organized office atmosphere"),
];

const POSTURES: Table = &[
    ("Medium Shot", "confident upright posture, hands naturally positioned"),
    ("Close-Up", "direct eye contact, shoulders relaxed, professional headshot pose"),
    ("Wide Shot", "full body confident stance, natural workplace positioning"),
    ("Portrait", "professional portrait pose, engaging body language"),
    ("Environmental", "natural interaction with environment, authentic workplace posture"),
];

const PERSPECTIVES: Table = &[
    ("Medium Shot", "shot from chest up, slightly angled perspective"),
    ("Close-Up", "intimate close-up perspective, shallow depth of field"),
    ("Wide Shot", "wide environmental perspective, context-rich composition"),
    ("Portrait", "centered portrait perspective, professional framing"),
    ("Environmental", "environmental storytelling perspective, workplace context"),
];

const CAMERAS: Table = &[
    ("Medium Shot", "shot with 85mm lens, medium focal length"),
    ("Close-Up", "shot with 135mm lens, portrait focal length, shallow DoF"),
    ("Wide Shot", "shot with 35mm lens, wide angle perspective"),
    ("Portrait", "shot with 85mm portrait lens, professional headshot setup"),
    ("Environmental", "shot with 50mm lens, natural field of view"),
];

const LIGHTING: Table = &[
    ("Natürliches Licht", "natural window lighting, soft daylight, golden hour warmth"),
    (
        "Studioleuchten",
        "professional studio lighting setup, three-point lighting, key and fill lights",
    ),
    (
        "Warme Beleuchtung",
        "warm tungsten lighting, cozy atmosphere, golden color temperature",
    ),
    (
        "Kalte Beleuchtung",
        "cool LED lighting, modern clinical feel, daylight color temperature",
    ),
    (
        "Dramatische Beleuchtung",
        "dramatic directional lighting, strong shadows, high contrast",
    ),
];

const STYLE_TREATMENTS: Table = &[
    ("Fotorealistisch", "photorealistic rendering, authentic photography style"),
    ("Künstlerisch", "artistic interpretation, creative visual treatment"),
    ("Dokumentarisch", "documentary photography style, candid authentic moments"),
    ("Werbung", "commercial advertising photography, polished marketing aesthetic"),
    ("Editorial", "editorial photography style, storytelling visual approach"),
];

const STYLE_RENDERINGS: Table = &[
    (
        "Fotorealistisch",
        "photorealistic rendering, authentic workplace photography, natural colors",
    ),
    (
        "Künstlerisch",
        "artistic photography, creative composition, enhanced visual appeal",
    ),
    (
        "Dokumentarisch",
        "documentary style, candid moments, authentic workplace capture",
    ),
    (
        "Werbung",
        "commercial photography quality, polished marketing aesthetic, brand-ready visuals",
    ),
    (
        "Editorial",
        "editorial photography standard, storytelling composition, magazine quality",
    ),
];

/// Applied in order; "Empathische Pflegekraft" must win over "Pflegekraft".
const MOTIV_TRANSLATIONS: Table = &[
    ("Empathische Pflegekraft", "empathetic healthcare professional"),
    ("Pflegekraft", "healthcare worker"),
    ("mittleren Alters", "middle-aged"),
    ("warmem Kasack", "warm-colored medical uniform"),
    ("moderner Klinik", "modern clinic"),
    ("lichtdurchfluteter", "bright, well-lit"),
    ("steht in", "standing in"),
    ("Krankenhaus", "hospital"),
    ("medizinische", "medical"),
    ("professionell", "professional"),
];

const PROFESSION_TRANSLATIONS: Table = &[
    ("Gesundheits- und Krankenpfleger/in", "professional nurse"),
    ("Pflegekraft", "healthcare professional"),
    ("Arzt", "doctor"),
    ("Ärztin", "doctor"),
    ("Therapeut", "therapist"),
    ("Software-Entwickler", "software developer"),
];

const BASE_NEGATIVES: [&str; 11] = [
    "amateur photography",
    "low quality",
    "blurry",
    "distorted faces",
    "unnatural proportions",
    "oversaturated colors",
    "generic stock photo",
    "artificial lighting",
    "unprofessional setting",
    "cluttered background",
    "poor composition",
];

const TEXT_NEGATIVES: [&str; 5] = [
    "blurry text",
    "unreadable text",
    "distorted letters",
    "corrupted characters",
    "illegible writing",
];

pub fn translate_to_english(german: &str) -> String {
    MOTIV_TRANSLATIONS
        .iter()
        .fold(german.to_string(), |text, (de, en)| text.replace(de, en))
}

pub fn translate_profession(german: &str) -> &'static str {
    let lower = german.to_lowercase();
    PROFESSION_TRANSLATIONS
        .iter()
        .find(|(de, _)| lower.contains(&de.to_lowercase()))
        .map(|(_, en)| *en)
        .unwrap_or("healthcare professional")
}

pub fn generate(data: &LayoutIntegratedData, enable_text_rendering: bool) -> String {
    let input = &data.structured_input;
    let layout = &data.layout_definition;

    let parts = [
        subject_description(input),
        scene_environment(input, layout),
        posture_perspective(input, layout),
        camera_lighting(input),
        composition_balance(layout),
        corporate_design(input),
        text_layout_areas(data, enable_text_rendering),
        style_rendering(input, enable_text_rendering),
    ];

    let main_prompt = parts
        .iter()
        .filter(|part| !part.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "{main_prompt} {} {}",
        parameters(&data.motiv_treatment),
        negative_prompts()
    );

    debug!(
        subject = parts[0].chars().count(),
        scene = parts[1].chars().count(),
        text_layout = parts[6].chars().count(),
        total = prompt.chars().count(),
        enable_text_rendering,
        "Midjourney prompt assembled"
    );

    prompt.trim().to_string()
}

fn layout_name_lower(layout: &LayoutDefinition) -> String {
    layout.name.as_deref().unwrap_or("").to_lowercase()
}

fn subject_description(input: &StructuredInput) -> String {
    let mut parts = Vec::new();

    match input.motiv_source {
        MotivSource::Upload => {
            parts.push("📎 use attached reference image as visual inspiration".to_string());
            parts.push("professional marketing style adaptation".to_string());
            if !input.motiv_prompt.trim().is_empty() {
                parts.push(format!(
                    "additional details: {}",
                    translate_to_english(&input.motiv_prompt)
                ));
            }
        }
        MotivSource::Text => parts.push(translate_to_english(&input.motiv_prompt)),
    }

    if !input.position_long.is_empty() {
        parts.push(format!("working as {}", translate_profession(&input.position_long)));
    }

    parts.push(
        lookup(EMOTIONS, &input.lighting_mood, "professional and approachable expression")
            .to_string(),
    );

    parts.join(", ")
}

fn scene_environment(input: &StructuredInput, layout: &LayoutDefinition) -> String {
    let mut parts = Vec::new();

    if !input.company.is_empty() && !input.location.is_empty() {
        let company = input.company.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| company.contains(w));
        let location = &input.location;

        let environment = if has_any(&["tech", "software", "digital"]) {
            format!("modern tech office in {location}, open workspace with computers and monitors")
        } else if has_any(&["hospital", "clinic", "medical", "health"]) {
            format!("contemporary medical facility in {location}, clean healthcare environment")
        } else if has_any(&["bank", "finance"]) {
            format!("sleek corporate office in {location}, professional business setting")
        } else {
            format!(
                "modern {} workplace in {location}, professional office environment",
                input.company
            )
        };
        parts.push(environment);
    }

    let layout_name = layout_name_lower(layout);
    let interaction = if layout_name.contains("hero") {
        "dynamic workplace interaction, collaborative atmosphere"
    } else if layout_name.contains("team") {
        "team collaboration, group dynamic, productive workspace"
    } else {
        "authentic workplace scene, natural work environment"
    };
    parts.push(interaction.to_string());

    parts.push(
        lookup(ATMOSPHERES, &input.lighting_mood, "professional business atmosphere").to_string(),
    );

    parts.join(", ")
}

fn posture_perspective(input: &StructuredInput, layout: &LayoutDefinition) -> String {
    let layout_name = layout_name_lower(layout);
    let composition = if layout_name.contains("hero") {
        "heroic composition, dynamic rule of thirds, visual impact"
    } else if layout_name.contains("grid") {
        "structured grid composition, balanced layout, geometric harmony"
    } else if layout_name.contains("card") {
        "centered card composition, balanced framing, professional layout"
    } else {
        "balanced composition, rule of thirds, visual hierarchy"
    };

    [
        lookup(POSTURES, &input.framing, "confident professional posture"),
        lookup(PERSPECTIVES, &input.framing, "professional perspective"),
        composition,
    ]
    .join(", ")
}

fn camera_lighting(input: &StructuredInput) -> String {
    [
        lookup(CAMERAS, &input.framing, "shot with professional DSLR camera"),
        lookup(LIGHTING, &input.lighting_type, "professional corporate lighting"),
        lookup(
            STYLE_TREATMENTS,
            &input.visual_style,
            "professional commercial photography",
        ),
    ]
    .join(", ")
}

fn composition_balance(layout: &LayoutDefinition) -> String {
    let layout_name = layout_name_lower(layout);
    let mut parts: Vec<String> = if layout_name.contains("hero") {
        vec![
            "heroic central composition, 60/40 visual weight distribution".into(),
            "prominent subject placement, secondary elements balanced".into(),
        ]
    } else if layout_name.contains("grid") {
        vec![
            "structured grid layout, systematic visual organization".into(),
            "balanced geometric composition, clean sectional arrangement".into(),
        ]
    } else if layout_name.contains("card") {
        vec![
            "centered card layout, symmetrical balance".into(),
            "contained composition, focused visual hierarchy".into(),
        ]
    } else if layout_name.contains("split") {
        vec![
            "split composition, 50/50 visual balance".into(),
            "dual-focus layout, harmonious division".into(),
        ]
    } else {
        vec!["balanced composition, visual hierarchy, professional layout".into()]
    };

    let text_zones = layout
        .zones
        .iter()
        .filter(|zone| {
            zone.content_type
                .as_deref()
                .is_some_and(|kind| kind.to_lowercase().contains("text"))
        })
        .count();
    if text_zones > 0 {
        parts.push(format!(
            "composition with designated text areas, {text_zones} content zones"
        ));
    }

    parts.push("optimal negative space usage, professional visual weight distribution".into());
    parts.join(", ")
}

fn corporate_design(input: &StructuredInput) -> String {
    let colors = &input.ci_colors;
    let primary = hex_to_color_description(&colors.primary);
    let secondary = hex_to_color_description(&colors.secondary);
    let accent = hex_to_color_description(&colors.accent);

    let mut parts = vec![
        format!("corporate color scheme with {primary} as primary brand color"),
        format!("{secondary} supporting elements, {accent} accent highlights"),
    ];

    if !input.location.is_empty() {
        parts.push(format!(
            "{accent} location highlighting, location pin with accent color"
        ));
        parts.push(format!("location indicator using {accent} for visual emphasis"));
        parts.push(format!(
            "{accent} call-to-action button with white text for maximum readability"
        ));
    }

    parts.push("professional brand consistency, cohesive corporate visual identity".into());
    parts.join(", ")
}

fn text_layout_areas(data: &LayoutIntegratedData, enable_text_rendering: bool) -> String {
    if data.text_placements.is_empty() {
        return String::new();
    }

    let input = &data.structured_input;
    let accent = &input.ci_colors.accent;
    let mut parts: Vec<String> = Vec::new();

    if enable_text_rendering {
        parts.push("marketing layout with readable text elements:".into());

        if let Some(PlacementContent::Text(headline)) = data.placement("headline").map(|p| &p.content) {
            parts.push(format!(
                "prominent headline text '{headline}' in professional typography"
            ));
        }
        if let Some(PlacementContent::List(benefits)) = data.placement("benefits").map(|p| &p.content) {
            parts.push(format!(
                "bullet point benefits section with {} key selling points",
                benefits.len()
            ));
        }
        if let Some(PlacementContent::Text(cta)) = data.placement("cta").map(|p| &p.content) {
            parts.push(format!("call-to-action button with '{cta}' text in accent color"));
            parts.push("white text on accent color background for maximum readability".into());
        }
        if !input.company.is_empty() {
            parts.push(format!("company branding for {}", input.company));
        }
        if !input.position_long.is_empty() {
            parts.push(format!(
                "job position '{}' clearly displayed",
                input.position_long
            ));
        }
        if !input.location.is_empty() {
            parts.push(format!(
                "location pin with '📍 {}' in accent color {accent}",
                input.location
            ));
            parts.push("location indicator with pin symbol and highlighted text".into());
            parts.push("white text on accent color background for maximum readability".into());
        }
    } else {
        parts.push("clean professional marketing layout".into());
        parts.push("balanced composition with visual hierarchy".into());
        parts.push("modern design with clear visual zones".into());
        parts.push("professional spacing and layout structure".into());

        if !input.location.is_empty() {
            parts.push(format!("location area with accent color {accent}"));
            parts.push("location pin symbol as visual element".into());
            parts.push("cta button in accent color with professional styling".into());
        }
    }

    parts.join(", ")
}

fn style_rendering(input: &StructuredInput, enable_text_rendering: bool) -> String {
    let mut parts = vec![
        "ultra-high quality, professional photography",
        "sharp focus, detailed textures, realistic lighting",
    ];

    if enable_text_rendering {
        parts.push("readable text integration, professional typography");
        parts.push("high-contrast text visibility, marketing campaign ready");
    } else {
        parts.push("clean layout composition with designated content areas");
        parts.push("professional space allocation for text overlays");
        parts.push("marketing-ready background without text elements");
    }

    parts.push(lookup(
        STYLE_RENDERINGS,
        &input.visual_style,
        "commercial photography quality",
    ));
    parts.push("employer branding quality, talent acquisition appeal");
    parts.push("professional workplace representation, career opportunity visualization");

    parts.join(", ")
}

fn parameters(motiv: &MotivTreatment) -> String {
    format!("--ar {} --style raw --q 2 --c 20", motiv.aspect_ratio)
}

/// Text-related negatives are included in both rendering modes.
fn negative_prompts() -> String {
    let negatives: Vec<&str> = BASE_NEGATIVES.iter().chain(TEXT_NEGATIVES.iter()).copied().collect();
    format!("--no {}", negatives.join(", "))
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

    fn make_data(layout_id: &str, raw: RawCreativeInput) -> LayoutIntegratedData {
        let input = process_input(RawCreativeInput {
            layout_id: Some(layout_id.to_string()),
            ..raw
        });
        integrate(&LayoutCatalog::default(), input).unwrap()
    }

    fn make_raw() -> RawCreativeInput {
        RawCreativeInput {
            headline: Some("Pflege mit Herz".to_string()),
            company: Some("Health Clinic Nord".to_string()),
            location: Some("Hamburg".to_string()),
            position_long: Some("Pflegekraft Intensivstation".to_string()),
            benefits: vec!["Faire Bezahlung".to_string()],
            motiv_prompt: Some("Empathische Pflegekraft in moderner Klinik".to_string()),
            lighting_mood: Some("Einladend".to_string()),
            framing: Some("Close-Up".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_translation_order() {
        assert_eq!(
            translate_to_english("Empathische Pflegekraft steht in moderner Klinik"),
            "empathetic healthcare professional standing in modern clinic"
        );
        assert_eq!(translate_to_english("Pflegekraft"), "healthcare worker");
    }

    #[test]
    fn test_profession_translation_default() {
        assert_eq!(translate_profession("Ärztin im Dienst"), "doctor");
        assert_eq!(translate_profession("Koch"), "healthcare professional");
    }

    #[test]
    fn test_parameters_and_negatives_suffix() {
        let prompt = generate(&make_data("skizze1_vertical_split", make_raw()), false);
        assert!(prompt.contains("--ar 1:1 --style raw --q 2 --c 20 --no amateur photography"));
        assert!(prompt.ends_with("corrupted characters, illegible writing"));
    }

    #[test]
    fn test_subject_and_scene_mappings() {
        let prompt = generate(&make_data("skizze1_vertical_split", make_raw()), false);
        assert!(prompt.starts_with("empathetic healthcare professional in modern clinic"));
        assert!(prompt.contains("working as healthcare professional"));
        assert!(prompt.contains("warm and welcoming smile"));
        assert!(prompt.contains("contemporary medical facility in Hamburg"));
        assert!(prompt.contains("shot with 135mm lens"));
        assert!(prompt.contains("split composition, 50/50 visual balance"));
        assert!(prompt.contains("2 content zones"), "text_zone and footer_zone carry text");
    }

    #[test]
    fn test_upload_mode_subject() {
        let raw = RawCreativeInput {
            motiv_source: Some(MotivSource::Upload),
            ..make_raw()
        };
        let prompt = generate(&make_data("skizze1_vertical_split", raw), false);
        assert!(prompt.starts_with("📎 use attached reference image as visual inspiration"));
        assert!(prompt.contains("additional details: empathetic healthcare professional"));
    }

    #[test]
    fn test_text_rendering_switches_layout_section() {
        let data = make_data("skizze1_vertical_split", make_raw());

        let layout_mode = generate(&data, false);
        assert!(layout_mode.contains("marketing-ready background without text elements"));
        assert!(layout_mode.contains("location area with accent color #FFC20E"));
        assert!(!layout_mode.contains("prominent headline text"));

        let text_mode = generate(&data, true);
        assert!(text_mode.contains("prominent headline text 'Pflege mit Herz'"));
        assert!(text_mode.contains("bullet point benefits section with 1 key selling points"));
        assert!(text_mode.contains("call-to-action button with 'Jetzt bewerben!' text"));
        assert!(text_mode.contains("location pin with '📍 Hamburg' in accent color #FFC20E"));
    }

    #[test]
    fn test_hero_layout_composition() {
        let prompt = generate(&make_data("skizze14_hero_layout", make_raw()), false);
        assert!(prompt.contains("dynamic workplace interaction"));
        assert!(prompt.contains("heroic central composition"));
        assert!(prompt.contains("--ar 4:5"));
    }
}
