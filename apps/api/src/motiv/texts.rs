//! Headline and subline generation styled to a chosen feeling.
//!
//! The headline is written by the text optimizer; when that call fails the
//! headline comes from the feeling's templates. Sublines always come from
//! templates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::TextOptimizer;
use crate::motiv::{prompts, variant_index};

const DEFAULT_BENEFITS: [&str; 3] = [
    "Flexible Arbeitszeiten",
    "Attraktive Vergütung",
    "Fortbildungsmöglichkeiten",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Heroisch,
    #[default]
    Motivierend,
    Einladend,
    Inspirierend,
    Stolz,
    Innovativ,
    Empathisch,
    Dynamisch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeelingStyle {
    pub description: &'static str,
    pub tone: &'static str,
    pub examples: [&'static str; 3],
}

impl Feeling {
    pub const ALL: [Feeling; 8] = [
        Feeling::Heroisch,
        Feeling::Motivierend,
        Feeling::Einladend,
        Feeling::Inspirierend,
        Feeling::Stolz,
        Feeling::Innovativ,
        Feeling::Empathisch,
        Feeling::Dynamisch,
    ];

    /// Case-insensitive; anything unknown is `Motivierend`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|feeling| feeling.as_str() == value)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Heroisch => "heroisch",
            Feeling::Motivierend => "motivierend",
            Feeling::Einladend => "einladend",
            Feeling::Inspirierend => "inspirierend",
            Feeling::Stolz => "stolz",
            Feeling::Innovativ => "innovativ",
            Feeling::Empathisch => "empathisch",
            Feeling::Dynamisch => "dynamisch",
        }
    }

    pub fn style(&self) -> FeelingStyle {
        let (description, tone, examples) = match self {
            Feeling::Heroisch => (
                "Kraftvoll, selbstbewusst, inspirierend",
                "selbstbewusst und motivierend",
                ["Wir, weil wer sonst", "Die Zukunft wartet auf uns", "Exzellenz ist unser Standard"],
            ),
            Feeling::Motivierend => (
                "Energisch, aufbauend, zielgerichtet",
                "energisch und aufbauend",
                [
                    "Dein Potential. Unsere Mission.",
                    "Gemeinsam schaffen wir das Unmögliche",
                    "Jeder Tag ist eine neue Chance",
                ],
            ),
            Feeling::Einladend => (
                "Warm, offen, einladend",
                "warm und einladend",
                ["Komm zu uns", "Wir freuen uns auf dich", "Werde Teil unserer Geschichte"],
            ),
            Feeling::Inspirierend => (
                "Visionär, bewegend, transformativ",
                "visionär und bewegend",
                [
                    "Verändere Leben. Beginne mit deinem.",
                    "Neue Wege, neue Lösungen",
                    "Die Zukunft gestalten",
                ],
            ),
            Feeling::Stolz => (
                "Stolz, professionell, exklusiv",
                "stolz und professionell",
                [
                    "Exzellenz ist unser Standard",
                    "Wir sind stolz auf unser Team",
                    "Qualität hat einen Namen",
                ],
            ),
            Feeling::Innovativ => (
                "Modern, fortschrittlich, zukunftsweisend",
                "modern und fortschrittlich",
                ["Die Zukunft gestalten", "Neue Wege, neue Lösungen", "Innovation lebt hier"],
            ),
            Feeling::Empathisch => (
                "Menschlich, fürsorglich, verständnisvoll",
                "menschlich und fürsorglich",
                [
                    "Menschlichkeit im Mittelpunkt",
                    "Wir kümmern uns um dich",
                    "Jeder Mensch zählt",
                ],
            ),
            Feeling::Dynamisch => (
                "Bewegt, lebendig, aktiv",
                "dynamisch und lebendig",
                ["Bewegung schafft Wandel", "Gemeinsam vorwärts", "Leben ist Bewegung"],
            ),
        };
        FeelingStyle {
            description,
            tone,
            examples,
        }
    }

    /// Only three feelings have their own templates; the rest share `Motivierend`'s.
    fn headline_templates(&self) -> &'static [&'static str] {
        match self {
            Feeling::Heroisch => &[
                "Wir, weil wer sonst",
                "Die Zukunft wartet auf uns",
                "Exzellenz ist unser Standard",
                "Wir sind die Besten",
                "Dein Potential, unsere Mission",
            ],
            Feeling::Einladend => &[
                "Komm zu uns",
                "Wir freuen uns auf dich",
                "Werde Teil unserer Geschichte",
                "Du fehlst uns noch",
                "Willkommen im Team",
            ],
            _ => &[
                "Dein Potential. Unsere Mission.",
                "Gemeinsam schaffen wir das Unmögliche",
                "Jeder Tag ist eine neue Chance",
                "Wir glauben an dich",
                "Deine Zukunft beginnt hier",
            ],
        }
    }

    /// `{company}` is replaced with the company name.
    fn subline_templates(&self) -> &'static [&'static str] {
        match self {
            Feeling::Heroisch => &[
                "Gestalte mit uns die Zukunft des {company}",
                "Bei uns wird jeder Tag zu einer Erfolgsgeschichte",
                "Wir suchen Menschen, die mehr als nur arbeiten wollen",
                "Gemeinsam erreichen wir das Unmögliche",
            ],
            Feeling::Einladend => &[
                "Bei {company} findest du deinen Platz",
                "Wir öffnen dir die Türen zu neuen Möglichkeiten",
                "Deine Talente sind bei uns willkommen",
                "Lass uns gemeinsam Großes schaffen",
            ],
            _ => &[
                "Bei {company} wirst du Teil eines dynamischen Teams",
                "Wir bieten dir alle Möglichkeiten zur Entwicklung",
                "Deine Karriere verdient den besten Start",
                "Lass uns gemeinsam wachsen",
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeelingInfo {
    pub feeling: Feeling,
    #[serde(flatten)]
    pub style: FeelingStyle,
}

pub fn available_feelings() -> Vec<FeelingInfo> {
    Feeling::ALL
        .into_iter()
        .map(|feeling| FeelingInfo {
            feeling,
            style: feeling.style(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreativeTextRequest {
    #[serde(alias = "unternehmen")]
    pub company: String,
    #[serde(alias = "stellentitel")]
    pub job_title: String,
    #[serde(default)]
    pub cta: String,
    /// Empty means the three standard benefits.
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub feeling: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Template index; derived from company and job title when absent.
    #[serde(default)]
    pub variant: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Optimizer,
    Template,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedTexts {
    pub feeling: Feeling,
    pub headline: String,
    pub subline: String,
    pub headline_source: TextSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// Returns `(system, user)` messages for the headline call.
pub fn headline_prompts(request: &CreativeTextRequest, feeling: Feeling) -> (String, String) {
    let style = feeling.style();
    let system = prompts::HEADLINE_SYSTEM_TEMPLATE
        .replace("{description}", style.description)
        .replace("{tone}", style.tone)
        .replace("{examples}", &style.examples.join(", "));

    let benefits = if request.benefits.iter().all(|b| b.trim().is_empty()) {
        DEFAULT_BENEFITS.join(", ")
    } else {
        request.benefits.join(", ")
    };
    let location = request
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("Nicht angegeben");

    let user = prompts::HEADLINE_PROMPT_TEMPLATE
        .replace("{company}", &request.company)
        .replace("{job_title}", &request.job_title)
        .replace("{cta}", &request.cta)
        .replace("{benefits}", &benefits)
        .replace("{location}", location)
        .replace("{feeling}", feeling.as_str())
        .replace("{tone}", style.tone);

    (system, user)
}

/// First non-empty line with surrounding quotes removed.
fn clean_headline(reply: &str) -> Option<String> {
    reply
        .lines()
        .map(|line| line.trim().trim_matches(|c: char| matches!(c, '"' | '„' | '“' | '”')).trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct CreativeTextGenerator {
    optimizer: Arc<dyn TextOptimizer>,
}

impl CreativeTextGenerator {
    pub fn new(optimizer: Arc<dyn TextOptimizer>) -> Self {
        Self { optimizer }
    }

    /// Never fails: an optimizer error falls back to a template headline.
    pub async fn generate(&self, request: &CreativeTextRequest) -> GeneratedTexts {
        let feeling = Feeling::parse(&request.feeling);
        info!(company = %request.company, feeling = feeling.as_str(), "Generating creative texts");

        let seed = [request.company.as_str(), request.job_title.as_str()];
        let (system, user) = headline_prompts(request, feeling);

        let optimized = match self.optimizer.optimize(&user, Some(&system)).await {
            Ok(reply) => clean_headline(&reply),
            Err(e) => {
                warn!("Headline generation failed, using template: {e}");
                None
            }
        };
        let (headline, headline_source) = match optimized {
            Some(headline) => (headline, TextSource::Optimizer),
            None => {
                let templates = feeling.headline_templates();
                let index = variant_index(request.variant, &seed, templates.len());
                (templates[index].to_string(), TextSource::Template)
            }
        };

        let sublines = feeling.subline_templates();
        let subline = sublines[variant_index(request.variant, &seed, sublines.len())]
            .replace("{company}", &request.company);

        GeneratedTexts {
            feeling,
            headline,
            subline,
            headline_source,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creative::generator::tests::FakeOptimizer;

    fn make_request(feeling: &str, variant: Option<usize>) -> CreativeTextRequest {
        CreativeTextRequest {
            company: "Klinikum Nord".to_string(),
            job_title: "Pflegefachkraft (m/w/d)".to_string(),
            cta: "Jetzt bewerben".to_string(),
            benefits: Vec::new(),
            feeling: feeling.to_string(),
            location: None,
            variant,
        }
    }

    fn generator(reply: Option<&str>) -> CreativeTextGenerator {
        CreativeTextGenerator::new(Arc::new(FakeOptimizer {
            reply: reply.map(str::to_string),
        }))
    }

    #[test]
    fn test_feeling_parse_defaults_to_motivierend() {
        assert_eq!(Feeling::parse(" HEROISCH "), Feeling::Heroisch);
        assert_eq!(Feeling::parse("stolz"), Feeling::Stolz);
        assert_eq!(Feeling::parse("wütend"), Feeling::Motivierend);
        assert_eq!(Feeling::parse(""), Feeling::Motivierend);
        assert_eq!(available_feelings().len(), 8);
    }

    #[test]
    fn test_headline_prompts_fill_style_and_defaults() {
        let (system, user) = headline_prompts(&make_request("heroisch", None), Feeling::Heroisch);

        assert!(system.contains("TON: selbstbewusst und motivierend"));
        assert!(system.contains("BEISPIELE: Wir, weil wer sonst, Die Zukunft wartet auf uns"));
        assert!(user.contains("Benefits: Flexible Arbeitszeiten, Attraktive Vergütung, Fortbildungsmöglichkeiten"));
        assert!(user.contains("Standort: Nicht angegeben"));
        assert!(user.ends_with("Erstelle eine selbstbewusst und motivierend HEADLINE für diese Stellenausschreibung."));
    }

    #[tokio::test]
    async fn test_headline_from_optimizer_is_cleaned() {
        let texts = generator(Some("  \"Pflege, die bewegt\"  \n"))
            .generate(&make_request("motivierend", Some(0)))
            .await;

        assert_eq!(texts.headline, "Pflege, die bewegt");
        assert_eq!(texts.headline_source, TextSource::Optimizer);
        assert_eq!(texts.subline, "Bei Klinikum Nord wirst du Teil eines dynamischen Teams");
    }

    #[tokio::test]
    async fn test_optimizer_failure_uses_feeling_templates() {
        let texts = generator(None)
            .generate(&make_request("heroisch", Some(0)))
            .await;

        assert_eq!(texts.feeling, Feeling::Heroisch);
        assert_eq!(texts.headline, "Wir, weil wer sonst");
        assert_eq!(texts.headline_source, TextSource::Template);
        assert_eq!(texts.subline, "Gestalte mit uns die Zukunft des Klinikum Nord");
    }

    #[tokio::test]
    async fn test_feeling_without_templates_shares_motivierend() {
        let texts = generator(Some("   ")).generate(&make_request("stolz", Some(6))).await;

        // 6 wraps to 1 of 5 headlines and 2 of 4 sublines.
        assert_eq!(texts.headline, "Gemeinsam schaffen wir das Unmögliche");
        assert_eq!(texts.subline, "Deine Karriere verdient den besten Start");
        assert_eq!(texts.headline_source, TextSource::Template);
    }
}
