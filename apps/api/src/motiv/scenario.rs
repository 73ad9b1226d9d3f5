//! Scenario-based Midjourney motiv prompts.
//!
//! A scenario picks one of three English base prompts; the job title swaps the
//! generic "healthcare professionals" for a matching role description. The
//! optimizer can optionally refine the result.

use std::sync::{Arc, LazyLock};

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::TextOptimizer;
use crate::motiv::{prompts, variant_index};

static GENERIC_PEOPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"healthcare professionals?").expect("valid people pattern"));

static PARAMETER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"--q\s+[0-9]*\.?[0-9]+|--ar\s+[0-9]*\.?[0-9]+:[0-9]*\.?[0-9]+")
        .expect("valid parameter pattern")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

const CREATIVE_ENHANCEMENTS: [&str; 5] = [
    "cinematic composition, professional color grading, premium quality",
    "artistic framing, sophisticated lighting, exceptional clarity",
    "dynamic perspective, creative composition, outstanding resolution",
    "masterful photography, elegant styling, superior craftsmanship",
    "innovative approach, contemporary aesthetic, premium execution",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Employer,
    #[default]
    Workplace,
    Team,
    Empathy,
    Technology,
    Hero,
    Standort,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::Employer,
        Scenario::Workplace,
        Scenario::Team,
        Scenario::Empathy,
        Scenario::Technology,
        Scenario::Hero,
        Scenario::Standort,
    ];

    /// Case-insensitive; anything unknown is `Workplace`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|scenario| scenario.as_str() == value)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Employer => "employer",
            Scenario::Workplace => "workplace",
            Scenario::Team => "team",
            Scenario::Empathy => "empathy",
            Scenario::Technology => "technology",
            Scenario::Hero => "hero",
            Scenario::Standort => "standort",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::Employer => "Arbeitgeber-Marke & Standort",
            Scenario::Workplace => "Arbeitsumgebung im Pflegealltag",
            Scenario::Team => "Team- und Gemeinschaftsbilder",
            Scenario::Empathy => "Menschliche Nähe & Empathie",
            Scenario::Technology => "Moderne Technik & Innovation",
            Scenario::Hero => "Hero-Portrait",
            Scenario::Standort => "Standort-Wahrzeichen",
        }
    }

    /// `{company}` and `{location}` are replaced before use.
    fn base_prompts(&self) -> [&'static str; 3] {
        match self {
            Scenario::Employer => [
                "stunning modern hospital building of {company} in {location}, architectural photography, clean geometric lines, professional corporate appearance, distinctive corporate identity, iconic landmark building, vibrant urban setting, golden hour natural lighting, award-winning photography style, ultra high quality, intricate details, contemporary design, glass facade, sustainable architecture",
                "magnificent contemporary hospital complex of {company} located in {location}, architectural masterpiece, sleek modern design, corporate branding excellence, recognizable landmark structure, dynamic urban environment, dramatic natural lighting, professional architectural photography, exceptional quality, fine details, innovative design, premium materials, urban sophistication",
                "impressive state-of-the-art hospital facility of {company} in {location}, cutting-edge architecture, sophisticated corporate aesthetic, prominent landmark presence, bustling urban landscape, natural daylight streaming, professional photography excellence, outstanding quality, meticulous details, avant-garde design, luxury finishes, metropolitan elegance",
            ],
            Scenario::Workplace => [
                "dedicated healthcare professionals working passionately in modern hospital ward, bustling nursing station, advanced medical equipment, warm natural lighting, professional healthcare environment, authentic workplace atmosphere, realistic healthcare setting, exceptional detail, award-winning photography, compassionate care, medical excellence, healing environment",
                "skilled medical professionals delivering exceptional care in contemporary hospital ward, modern nursing station, cutting-edge medical technology, natural daylight illumination, professional medical environment, genuine workplace authenticity, realistic medical setting, outstanding detail, professional photography mastery, patient-centered care, clinical excellence, therapeutic atmosphere",
                "experienced healthcare team providing outstanding service in state-of-the-art hospital ward, innovative nursing station, sophisticated medical equipment, natural lighting design, professional healthcare setting, authentic workplace realism, true-to-life medical environment, superior detail, professional photography excellence, compassionate healthcare, medical professionalism, healing atmosphere",
            ],
            Scenario::Team => [
                "dynamic group of 3-6 dedicated healthcare professionals in crisp uniforms, radiant smiles, engaging team interaction, modern hospital setting, positive body language, professional appearance, natural lighting, authentic team camaraderie, exceptional quality, collaborative spirit, medical excellence, team synergy",
                "inspiring team of healthcare professionals in professional uniforms, warm smiles, collaborative interaction, contemporary hospital environment, confident body language, polished appearance, natural lighting, genuine team atmosphere, outstanding quality, teamwork excellence, healthcare dedication, group harmony",
                "motivated healthcare team in immaculate uniforms, genuine smiles, interactive collaboration, state-of-the-art hospital setting, positive body language, professional demeanor, natural lighting, authentic team spirit, superior quality, collaborative excellence, medical dedication, team unity",
            ],
            Scenario::Empathy => [
                "touching moment between compassionate healthcare professional and grateful patient, emotional hand holding, intimate conversation at eye level, warm golden lighting, artistic shallow depth of field, deeply emotional healthcare moment, authentic human connection, professional photography artistry, heartfelt care, emotional depth, healing touch",
                "heartwarming interaction between dedicated healthcare professional and appreciative patient, gentle hand holding, meaningful conversation, warm lighting atmosphere, creative shallow depth of field, emotionally rich healthcare scene, genuine human connection, professional photography excellence, compassionate care, emotional resonance, therapeutic connection",
                "moving encounter between caring healthcare professional and thankful patient, tender hand holding, heartfelt conversation, warm lighting design, artistic shallow depth of field, emotionally powerful healthcare moment, authentic human bond, professional photography mastery, empathetic care, emotional intensity, healing presence",
            ],
            Scenario::Technology => [
                "innovative healthcare professionals utilizing cutting-edge medical devices, advanced tablet technology, sophisticated EKG monitoring, digital documentation systems, pristine bright environment, modern medical technology, professional healthcare setting, exceptional detail, professional photography excellence, technological advancement, medical innovation, digital healthcare",
                "tech-savvy healthcare professionals operating state-of-the-art medical equipment, modern tablet interfaces, advanced cardiac monitoring, digital healthcare systems, immaculate bright environment, contemporary medical technology, professional medical setting, outstanding detail, professional photography mastery, technological excellence, medical advancement, digital transformation",
                "forward-thinking healthcare professionals leveraging innovative medical technology, cutting-edge tablet solutions, advanced monitoring systems, digital healthcare platforms, spotless bright environment, modern medical technology, professional healthcare setting, superior detail, professional photography excellence, technological leadership, medical innovation, digital excellence",
            ],
            Scenario::Hero => [
                "inspiring single healthcare professional portrait as everyday hero, confident gaze into camera, immaculate medical uniform, professional stethoscope, artistically blurred hospital background, dramatic professional lighting, powerful personal connection, exceptional quality portrait, heroic presence, medical dedication, professional pride",
                "remarkable healthcare professional portrait as daily hero, determined look at camera, pristine medical uniform, quality stethoscope, beautifully blurred hospital setting, professional lighting design, strong personal connection, outstanding quality portrait, heroic character, medical commitment, professional excellence",
                "exceptional healthcare professional portrait as workplace hero, focused gaze toward camera, perfect medical uniform, professional stethoscope, artistically blurred hospital environment, sophisticated professional lighting, compelling personal connection, superior quality portrait, heroic stature, medical devotion, professional distinction",
            ],
            Scenario::Standort => [
                "breathtaking famous landmark of {location}, iconic architectural masterpiece, regional landmark significance, stunning architectural photography, vibrant urban setting, natural lighting perfection, professional photography excellence, exceptional detail, landmark recognition, architectural beauty, urban charm, regional pride",
                "magnificent famous landmark of {location}, iconic building excellence, regional landmark prominence, outstanding architectural photography, dynamic urban environment, natural lighting artistry, professional photography mastery, outstanding detail, landmark distinction, architectural grandeur, urban sophistication, regional significance",
                "spectacular famous landmark of {location}, iconic architectural wonder, regional landmark importance, exceptional architectural photography, bustling urban setting, natural lighting brilliance, professional photography excellence, superior detail, landmark excellence, architectural magnificence, urban elegance, regional heritage",
            ],
        }
    }
}

/// Role description for the people in the scene; `None` for a blank title.
pub fn describe_job_title(job_title: &str) -> Option<&'static str> {
    let title = job_title.trim().to_lowercase();
    if title.is_empty() {
        return None;
    }
    let has = |words: &[&str]| words.iter().any(|w| title.contains(w));

    let description = if has(&["pflege", "nurse", "krankenschwester", "krankenpfleger"]) {
        if has(&["intensiv", "icu"]) {
            "dedicated intensive care nurses in professional scrubs"
        } else if has(&["ambulant", "ambulatory"]) {
            "compassionate ambulatory care nurses in modern uniforms"
        } else if has(&["stationär", "stationary"]) {
            "dedicated ward nurses in professional healthcare attire"
        } else {
            "skilled registered nurses in crisp medical uniforms"
        }
    } else if has(&["arzt", "doctor", "mediziner", "physician"]) {
        if has(&["chirurg", "surgeon"]) {
            "experienced surgeons in professional medical attire"
        } else if has(&["internist"]) {
            "knowledgeable internists in professional medical clothing"
        } else if has(&["anästhesist", "anesthesiologist"]) {
            "skilled anesthesiologists in professional medical wear"
        } else {
            "dedicated physicians in professional medical attire"
        }
    } else if has(&["therapeut", "therapist", "physio", "ergo"]) {
        if has(&["physio"]) {
            "skilled physical therapists in professional athletic wear"
        } else if has(&["ergo", "occupational"]) {
            "dedicated occupational therapists in professional attire"
        } else if has(&["psycho"]) {
            "compassionate psychotherapists in professional clothing"
        } else {
            "dedicated therapists in professional healthcare attire"
        }
    } else if has(&["verwaltung", "administration", "management", "leitung"]) {
        "professional healthcare administrators in business attire"
    } else if has(&["techniker", "technician", "labor", "radiologie", "radiology"]) {
        if has(&["labor"]) {
            "skilled laboratory technicians in professional lab coats"
        } else if has(&["radiologie", "radiology"]) {
            "experienced radiology technicians in professional medical attire"
        } else {
            "skilled medical technicians in professional uniforms"
        }
    } else if has(&["sozial", "social", "berater", "counselor"]) {
        "compassionate social workers in professional business attire"
    } else if has(&["fach"]) && !has(&["kraft", "assistent"]) {
        "skilled healthcare specialists in professional attire"
    } else {
        "dedicated healthcare professionals in professional uniforms"
    };
    Some(description)
}

/// Removes `--q` and `--ar` parameters and collapses whitespace.
pub fn strip_parameters(prompt: &str) -> String {
    let stripped = PARAMETER_RE.replace_all(prompt, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioRequest {
    pub scenario: String,
    #[serde(alias = "unternehmen")]
    pub company: String,
    pub location: String,
    #[serde(alias = "stellentitel")]
    pub job_title: String,
    /// Defaults to `Stelle: {job_title}` when a job title is given.
    pub custom_prompt: Option<String>,
    pub visual_style: Option<String>,
    pub lighting_type: Option<String>,
    pub lighting_mood: Option<String>,
    pub framing: Option<String>,
    /// Pass the template prompt through the text optimizer.
    pub refine: bool,
    /// Base prompt and enhancement index; derived from the inputs when absent.
    pub variant: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioMotiv {
    pub scenario: Scenario,
    pub scenario_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_interpretation: Option<&'static str>,
    pub prompt: String,
    pub length: usize,
    pub refined: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// Template prompt without style suffix or refinement.
pub fn template_prompt(request: &ScenarioRequest) -> (Scenario, Option<&'static str>, String) {
    let scenario = Scenario::parse(&request.scenario);
    let seed = [
        request.company.as_str(),
        request.location.as_str(),
        request.job_title.as_str(),
    ];
    let bases = scenario.base_prompts();
    let mut prompt = bases[variant_index(request.variant, &seed, bases.len())]
        .replace("{company}", request.company.trim())
        .replace("{location}", request.location.trim());

    let job = describe_job_title(&request.job_title);
    if let Some(description) = job {
        prompt = GENERIC_PEOPLE_RE
            .replace_all(&prompt, NoExpand(description))
            .into_owned();
    }

    let custom = match &request.custom_prompt {
        Some(custom) => custom.trim().to_string(),
        None if !request.job_title.trim().is_empty() => {
            format!("Stelle: {}", request.job_title.trim())
        }
        None => String::new(),
    };
    if !custom.is_empty() {
        prompt.push_str(", ");
        prompt.push_str(&custom);
    }

    let enhancement =
        CREATIVE_ENHANCEMENTS[variant_index(request.variant, &seed, CREATIVE_ENHANCEMENTS.len())];
    prompt.push_str(", ");
    prompt.push_str(enhancement);

    (scenario, job, strip_parameters(&prompt))
}

/// `, {value} Stil, {value} Beleuchtung, ...` for every given visual parameter.
fn style_suffix(request: &ScenarioRequest) -> String {
    [
        (&request.visual_style, "Stil"),
        (&request.lighting_type, "Beleuchtung"),
        (&request.lighting_mood, "Stimmung"),
        (&request.framing, "Bildausschnitt"),
    ]
    .into_iter()
    .filter_map(|(value, label)| {
        let value = value.as_deref()?.trim();
        (!value.is_empty()).then(|| format!(", {} {label}", value.to_lowercase()))
    })
    .collect()
}

#[derive(Clone)]
pub struct ScenarioMotivGenerator {
    optimizer: Arc<dyn TextOptimizer>,
}

impl ScenarioMotivGenerator {
    pub fn new(optimizer: Arc<dyn TextOptimizer>) -> Self {
        Self { optimizer }
    }

    /// Never fails: a failed or empty refinement keeps the template prompt.
    pub async fn generate(&self, request: &ScenarioRequest) -> ScenarioMotiv {
        let (scenario, job_interpretation, template) = template_prompt(request);
        info!(scenario = scenario.as_str(), refine = request.refine, "Generating scenario motiv");

        let mut refined = false;
        let mut prompt = template;
        if request.refine {
            match self
                .optimizer
                .optimize(&prompt, Some(prompts::SCENARIO_REFINE_SYSTEM))
                .await
            {
                Ok(reply) => {
                    let reply = strip_parameters(&reply);
                    if !reply.is_empty() {
                        prompt = reply;
                        refined = true;
                    }
                }
                Err(e) => warn!("Scenario refinement failed, keeping template prompt: {e}"),
            }
        }

        prompt.push_str(&style_suffix(request));
        ScenarioMotiv {
            scenario,
            scenario_name: scenario.name(),
            job_interpretation,
            length: prompt.chars().count(),
            prompt,
            refined,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
