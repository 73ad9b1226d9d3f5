//! Layout templates.
//!
//! Layouts are kept as raw YAML values so that CI color placeholders can be resolved
//! per request before the definition is deserialized into typed form.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{error, info};

pub const FALLBACK_LAYOUT_ID: &str = "skizze1_vertical_split";

const EMBEDDED_LAYOUTS: &str = include_str!("../../config/layouts.yaml");

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read layouts file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layouts: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("layout id must be a string")]
    InvalidKey,
}

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDefinition {
    pub name: Option<String>,
    pub description: String,
    pub canvas_size: Option<String>,
    pub complexity: Option<String>,
    pub zones: Vec<Zone>,
    pub text_mapping: BTreeMap<String, TextMappingRule>,
    pub motiv_integration: MotivIntegration,
    pub typography: Typography,
    pub adaptive_rules: BTreeMap<String, AdaptiveRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub name: String,
    pub position: Option<String>,
    pub background_color: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMappingRule {
    pub target_zone: Option<String>,
    pub position: Option<String>,
    pub coordinates: Option<String>,
    pub font_size: Option<FontSizeRule>,
    pub color: Option<String>,
    pub weight: Option<String>,
    pub max_length: Option<u32>,
    pub priority: Option<u32>,
}

/// Either a fixed size (`"22px"`) or tiers picked by content length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontSizeRule {
    Fixed(String),
    Tiered {
        primary: Option<String>,
        secondary: Option<String>,
        fallback: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotivIntegration {
    pub fill_mode: Option<String>,
    pub aspect_ratio: Option<String>,
    pub positioning: Option<String>,
    pub focal_point: Option<String>,
    pub overlay_compatibility: Option<bool>,
    pub text_safe_areas: Option<Vec<String>>,
    pub contrast_requirements: Option<String>,
    pub motiv_description_integration: Option<MotivDescriptionRules>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotivDescriptionRules {
    pub scene_focus: Option<String>,
    pub subject_positioning: Option<String>,
    pub lighting_preference: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub font_family: Option<String>,
    pub base_size: Option<String>,
    pub scale_ratio: Option<f64>,
    pub hierarchy: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveRule {
    pub trigger: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub complexity: Option<String>,
    pub zones_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// Ordered `layout_id → raw definition` table.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    layouts: Vec<(String, Value)>,
}

impl LayoutCatalog {
    /// Loads from `path` when given, otherwise from the embedded templates.
    /// Any failure falls back to the single-layout minimal catalog.
    pub fn load(path: Option<&Path>) -> Self {
        let loaded = match path {
            Some(path) => std::fs::read_to_string(path)
                .map_err(CatalogError::from)
                .and_then(|yaml| Self::from_yaml_str(&yaml)),
            None => Self::from_yaml_str(EMBEDDED_LAYOUTS),
        };

        match loaded {
            Ok(catalog) => {
                info!("Layout definitions loaded ({} layouts)", catalog.len());
                catalog
            }
            Err(e) => {
                error!("Failed to load layout definitions: {e}, using minimal fallback");
                Self::minimal()
            }
        }
    }

    /// Parses a YAML mapping of layouts. Every entry must deserialize as a
    /// `LayoutDefinition`.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let mapping: Mapping = serde_yaml::from_str(yaml)?;
        let mut layouts = Vec::with_capacity(mapping.len());

        for (key, value) in mapping {
            let id = key.as_str().ok_or(CatalogError::InvalidKey)?.to_string();
            serde_yaml::from_value::<LayoutDefinition>(value.clone())?;
            layouts.push((id, value));
        }

        Ok(Self { layouts })
    }

    pub fn minimal() -> Self {
        let zones = ["left_zone", "right_zone"]
            .into_iter()
            .map(|name| {
                let mut zone = Mapping::new();
                zone.insert("name".into(), name.into());
                Value::Mapping(zone)
            })
            .collect();

        let mut definition = Mapping::new();
        definition.insert("name".into(), "Vertikale Teilung".into());
        definition.insert("zones".into(), Value::Sequence(zones));

        Self {
            layouts: vec![(FALLBACK_LAYOUT_ID.to_string(), Value::Mapping(definition))],
        }
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Raw (unresolved) definition for `id`.
    pub fn get(&self, id: &str) -> Option<&Value> {
        self.layouts
            .iter()
            .find(|(layout_id, _)| layout_id == id)
            .map(|(_, value)| value)
    }

    pub fn summaries(&self) -> Vec<LayoutSummary> {
        self.layouts
            .iter()
            .filter_map(|(id, value)| {
                let definition: LayoutDefinition = serde_yaml::from_value(value.clone()).ok()?;
                Some(LayoutSummary {
                    id: id.clone(),
                    name: definition.name.unwrap_or_else(|| id.clone()),
                    description: definition.description,
                    complexity: definition.complexity,
                    zones_count: definition.zones.len(),
                })
            })
            .collect()
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::load(None)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = LayoutCatalog::from_yaml_str(EMBEDDED_LAYOUTS).unwrap();
        assert_eq!(catalog.len(), 14);
        assert!(catalog.contains("skizze1_vertical_split"));
        assert!(catalog.contains("skizze14_hero_layout"));
    }

    #[test]
    fn test_embedded_font_sizes_deserialize_both_shapes() {
        let catalog = LayoutCatalog::from_yaml_str(EMBEDDED_LAYOUTS).unwrap();
        let raw = catalog.get("skizze1_vertical_split").unwrap().clone();
        let definition: LayoutDefinition = serde_yaml::from_value(raw).unwrap();

        let headline = &definition.text_mapping["headline"];
        assert!(matches!(headline.font_size, Some(FontSizeRule::Tiered { .. })));
        let company = &definition.text_mapping["company"];
        assert_eq!(company.font_size, Some(FontSizeRule::Fixed("22px".to_string())));
    }

    #[test]
    fn test_summaries_keep_file_order() {
        let catalog = LayoutCatalog::default();
        let summaries = catalog.summaries();
        assert_eq!(summaries[0].id, "skizze1_vertical_split");
        assert_eq!(summaries[0].zones_count, 3);
        assert_eq!(summaries[2].id, "skizze3_grid");
        assert_eq!(summaries[2].zones_count, 7);
    }

    #[test]
    fn test_missing_file_falls_back_to_minimal() {
        let catalog = LayoutCatalog::load(Some(Path::new("/nonexistent/layouts.yaml")));
        assert_eq!(catalog.len(), 1);
        let summary = &catalog.summaries()[0];
        assert_eq!(summary.name, "Vertikale Teilung");
        assert_eq!(summary.zones_count, 2);
    }

    #[test]
    fn test_invalid_file_falls_back_to_minimal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "- just\n- a list").unwrap();

        let catalog = LayoutCatalog::load(Some(file.path()));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains(FALLBACK_LAYOUT_ID));
    }

    #[test]
    fn test_override_file_is_used() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "custom:\n  name: Custom\n  description: Eigenes Layout\n  zones:\n    - name: a"
        )
        .unwrap();

        let catalog = LayoutCatalog::load(Some(file.path()));
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("custom"));
        assert!(!catalog.contains(FALLBACK_LAYOUT_ID));
    }
}
