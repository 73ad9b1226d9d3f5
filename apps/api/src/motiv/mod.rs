//! Motiv and copy generation. The text-to-motiv converter here derives a scene
//! description by keyword matching; `texts` and `scenario` may call the text
//! optimizer and fall back to templates.

pub mod handlers;
pub mod prompts;
pub mod scenario;
pub mod texts;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    Pflege,
    Technik,
    Beratung,
    Bildung,
    Handel,
}

/// Iteration order decides ties: the first industry with the highest count wins.
const INDUSTRY_KEYWORDS: [(Industry, &[&str]); 5] = [
    (
        Industry::Pflege,
        &["pflege", "krankenhaus", "klinik", "station", "patient", "medizin", "gesundheit"],
    ),
    (
        Industry::Technik,
        &["entwickler", "programmierer", "software", "it", "digital", "technologie"],
    ),
    (
        Industry::Beratung,
        &["berater", "consulting", "strategie", "management", "planung"],
    ),
    (
        Industry::Bildung,
        &["lehrer", "dozent", "bildung", "schule", "universität", "lernen"],
    ),
    (
        Industry::Handel,
        &["verkäufer", "kassierer", "laden", "shop", "retail", "kunde"],
    ),
];

impl Industry {
    fn templates(&self) -> [&'static str; 3] {
        match self {
            Industry::Pflege => [
                "Professionelle Pflegekraft in moderner Krankenhausumgebung, freundlich lächelnd, Stethoskop um den Hals",
                "Engagierte Pflegekraft bei der Arbeit, konzentriert und einfühlsam, moderne medizinische Ausrüstung im Hintergrund",
                "Team von Pflegekräften in heller, sauberer Station, positive Atmosphäre, vertrauensvoll",
            ],
            Industry::Technik => [
                "Entwickler an modernem Arbeitsplatz, konzentriert vor mehreren Bildschirmen, professionelle Umgebung",
                "IT-Team in kollaborativer Arbeitsatmosphäre, moderne Büroausstattung, innovative Technologie",
                "Programmierer bei der Arbeit, fokussiert und kreativ, moderne Arbeitsumgebung",
            ],
            Industry::Beratung => [
                "Professioneller Berater in eleganter Büroumgebung, vertrauensvoll und kompetent",
                "Beratungsteam bei der Präsentation, moderne Konferenzräume, professionelle Atmosphäre",
                "Strategieberater bei der Arbeit, konzentriert und analytisch, hochwertige Büroausstattung",
            ],
            Industry::Bildung => [
                "Engagierter Lehrer in modernem Klassenzimmer, motivierend und inspirierend",
                "Dozent bei der Präsentation, moderne Hörsaalausstattung, professionelle Lernumgebung",
                "Bildungsexperte bei der Arbeit, konzentriert und leidenschaftlich, moderne Arbeitsumgebung",
            ],
            Industry::Handel => [
                "Freundlicher Verkäufer im modernen Laden, kundenorientiert und servicebereit",
                "Verkaufsteam in eleganter Geschäftsumgebung, professionell und einladend",
                "Kassierer bei der Arbeit, effizient und freundlich, moderne Verkaufsfläche",
            ],
        }
    }
}

const IMPORTANT_WORDS: [&str; 17] = [
    "team", "zukunft", "gesundheit", "pflege", "medizin", "technologie", "entwicklung",
    "beratung", "bildung", "verkauf", "service", "qualität", "innovation", "wachstum",
    "erfolg", "zusammenarbeit", "kompetenz",
];

const CONTEXTUAL_FALLBACK: &str =
    "Professionelle Person in moderner Arbeitsumgebung, engagiert und motiviert";

fn default_visual_style() -> String {
    "Professionell".to_string()
}

fn default_lighting_type() -> String {
    "Natürlich".to_string()
}

fn default_lighting_mood() -> String {
    "Vertrauensvoll".to_string()
}

fn default_framing() -> String {
    "Medium Shot".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MotivRequest {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub subline: String,
    #[serde(default)]
    pub stellentitel: String,
    #[serde(default)]
    pub position_long: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, alias = "unternehmen")]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_visual_style")]
    pub visual_style: String,
    #[serde(default = "default_lighting_type")]
    pub lighting_type: String,
    #[serde(default = "default_lighting_mood")]
    pub lighting_mood: String,
    #[serde(default = "default_framing")]
    pub framing: String,
    /// Template index within the industry; derived from the text when absent.
    #[serde(default)]
    pub variant: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotivResponse {
    pub industry: Industry,
    pub motiv: String,
    pub contextual_motiv: String,
}

pub fn identify_industry(request: &MotivRequest) -> Industry {
    let combined = [
        request.headline.as_str(),
        request.subline.as_str(),
        request.stellentitel.as_str(),
        request.position_long.as_str(),
        &request.benefits.join(" "),
    ]
    .join(" ")
    .to_lowercase();

    let mut best = Industry::Pflege;
    let mut max_matches = 0;
    for (industry, keywords) in INDUSTRY_KEYWORDS {
        let matches = keywords.iter().filter(|k| combined.contains(*k)).count();
        if matches > max_matches {
            max_matches = matches;
            best = industry;
        }
    }
    best
}

fn enrich(base: &str, request: &MotivRequest) -> String {
    let mut enriched = base.to_string();

    let company = request.company.to_lowercase();
    if company.contains("klinikum") || company.contains("krankenhaus") {
        enriched = enriched
            .replace("Krankenhausumgebung", &format!("{} Umgebung", request.company))
            .replace("Station", &format!("{} Station", request.company));
    }

    if !request.location.is_empty() && !enriched.contains(&request.location) {
        enriched.push_str(&format!(", Standort {}", request.location));
    }

    let position = request.stellentitel.to_lowercase();
    if position.contains("pflege") {
        enriched = enriched.replace("Person", "Pflegekraft");
    } else if position.contains("entwickler") || position.contains("programmierer") {
        enriched = enriched.replace("Person", "Entwickler");
    } else if position.contains("berater") {
        enriched = enriched.replace("Person", "Berater");
    }

    enriched
}

/// Parameters equal to their defaults are left out.
fn add_visual_parameters(motiv: String, request: &MotivRequest) -> String {
    let elements: Vec<String> = [
        (&request.visual_style, "Professionell", "Stil"),
        (&request.lighting_type, "Natürlich", "Beleuchtung"),
        (&request.lighting_mood, "Vertrauensvoll", "Stimmung"),
        (&request.framing, "Medium Shot", "Bildausschnitt"),
    ]
    .into_iter()
    .filter(|(value, default, _)| !value.is_empty() && value.as_str() != *default)
    .map(|(value, _, label)| format!("{} {label}", value.to_lowercase()))
    .collect();

    if elements.is_empty() {
        motiv
    } else {
        format!("{motiv}, {}", elements.join(", "))
    }
}

/// `variant` when given, otherwise the summed char count of `seed`; both wrap at `len`.
pub(crate) fn variant_index(variant: Option<usize>, seed: &[&str], len: usize) -> usize {
    variant.unwrap_or_else(|| seed.iter().map(|s| s.chars().count()).sum()) % len
}

pub fn generate_motiv(request: &MotivRequest) -> (Industry, String) {
    let industry = identify_industry(request);
    let templates = industry.templates();
    let index = variant_index(
        request.variant,
        &[&request.headline, &request.subline],
        templates.len(),
    );

    let enriched = enrich(templates[index], request);
    (industry, add_visual_parameters(enriched, request))
}

/// Up to five important words found in `text`, or a generic pair.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let keywords: Vec<String> = WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|word| word.chars().count() > 3 && IMPORTANT_WORDS.contains(word))
        .take(5)
        .map(str::to_string)
        .collect();

    if keywords.is_empty() {
        vec!["professionell".to_string(), "modern".to_string()]
    } else {
        keywords
    }
}

/// Needs both headline and subline; otherwise the generic fallback.
pub fn contextual_motiv(request: &MotivRequest) -> String {
    if request.headline.is_empty() || request.subline.is_empty() {
        return CONTEXTUAL_FALLBACK.to_string();
    }

    let mut parts = vec![
        format!("Person mit {}", extract_keywords(&request.headline).join(", ")),
        format!("in {} Umgebung", extract_keywords(&request.subline).join(", ")),
    ];
    if !request.benefits.is_empty() {
        let keywords = extract_keywords(&request.benefits.join(" "));
        parts.push(format!("mit Fokus auf {}", keywords.join(", ")));
    }

    format!("{}, professionell und vertrauensvoll", parts.join(", "))
}

pub fn convert(request: &MotivRequest) -> MotivResponse {
    let (industry, motiv) = generate_motiv(request);
    MotivResponse {
        industry,
        motiv,
        contextual_motiv: contextual_motiv(request),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
