//! CI color handling: validation, defaults and human-readable color names.
//!
//! Image models follow "tiefes Unternehmensblau" far better than `#005EA5`, so every
//! prompt renderer describes colors through this module.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_PRIMARY: &str = "#005EA5";
pub const DEFAULT_SECONDARY: &str = "#B4D9F7";
pub const DEFAULT_ACCENT: &str = "#FFC20E";
pub const DEFAULT_BACKGROUND: &str = "#FFFFFF";
pub const DEFAULT_TEXT: &str = "#000000";

/// The five corporate-identity color slots threaded through every prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CiColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
}

impl Default for CiColors {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY.to_string(),
            secondary: DEFAULT_SECONDARY.to_string(),
            accent: DEFAULT_ACCENT.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            text: DEFAULT_TEXT.to_string(),
        }
    }
}

impl CiColors {
    /// Builds a palette from a loose `slot → hex` map.
    /// Missing slots take their default silently; invalid ones are logged.
    pub fn from_map(colors: &BTreeMap<String, String>) -> Self {
        let pick = |slot: &str, default: &str| -> String {
            match colors.get(slot) {
                None => default.to_string(),
                Some(value) if is_valid_hex(value) => value.clone(),
                Some(value) => {
                    warn!("Invalid color '{value}' for {slot}, using default {default}");
                    default.to_string()
                }
            }
        };

        Self {
            primary: pick("primary", DEFAULT_PRIMARY),
            secondary: pick("secondary", DEFAULT_SECONDARY),
            accent: pick("accent", DEFAULT_ACCENT),
            background: pick("background", DEFAULT_BACKGROUND),
            text: pick("text", DEFAULT_TEXT),
        }
    }
}

/// Number of slots in a built palette.
pub const CI_COLOR_SLOTS: usize = 5;

/// Accepts `#RGB` and `#RRGGBB`. Only the shape is checked, not the digits.
pub fn is_valid_hex(color: &str) -> bool {
    color.starts_with('#') && matches!(color.chars().count(), 4 | 7)
}

const NAMED_COLORS: &[(&str, &str)] = &[
    ("#005ea5", "tiefes Unternehmensblau"),
    ("#0066cc", "professionelles Blau"),
    ("#4a90e2", "modernes Himmelblau"),
    ("#b4d9f7", "helles Akzentblau"),
    ("#e3f2fd", "sanftes Pastellblau"),
    ("#28a745", "kräftiges Geschäftsgrün"),
    ("#20c997", "modernes Mint"),
    ("#d4edda", "sanftes Hellgrün"),
    ("#dc3545", "kraftvolles Signalrot"),
    ("#ff6b6b", "warmes Akzentrot"),
    ("#ffc20e", "lebendiges Akzentgelb"),
    ("#ff9500", "energetisches Orange"),
    ("#ffcc00", "strahlendes Gelb"),
    ("#6c757d", "professionelles Grau"),
    ("#495057", "dunkles Businessgrau"),
    ("#f8f9fa", "helles Hintergrundgrau"),
    ("#e9ecef", "neutrales Hellgrau"),
    ("#ffffff", "reines Weiß"),
    ("#000000", "tiefes Schwarz"),
    ("#333333", "dunkles Anthrazit"),
];

/// Describes a hex color in German for the structured and Midjourney prompts.
///
/// Exact palette matches win; otherwise the dominant RGB channel decides, with
/// grays classified by average brightness.
pub fn hex_to_color_description(hex: &str) -> String {
    let lower = hex.to_lowercase();

    if let Some((_, name)) = NAMED_COLORS.iter().find(|(code, _)| *code == lower) {
        return (*name).to_string();
    }

    match parse_rgb(&lower) {
        Some((r, g, b)) => describe_rgb(r, g, b).to_string(),
        None => format!("Farbe {lower}"),
    }
}

fn parse_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    let expanded: String = if digits.chars().count() == 3 {
        digits.chars().flat_map(|c| [c, c]).collect()
    } else {
        digits.to_string()
    };

    if expanded.len() < 6 || !expanded.is_ascii() {
        return None;
    }

    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&expanded[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn describe_rgb(r: u8, g: u8, b: u8) -> &'static str {
    let tier = |value: u8, bright: &'static str, mid: &'static str, dark: &'static str| {
        if value > 200 {
            bright
        } else if value > 100 {
            mid
        } else {
            dark
        }
    };

    if r > g && r > b {
        tier(r, "helles Rot", "kräftiges Rot", "dunkles Rot")
    } else if g > r && g > b {
        tier(g, "helles Grün", "lebendiges Grün", "dunkles Grün")
    } else if b > r && b > g {
        tier(b, "helles Blau", "kräftiges Blau", "dunkles Blau")
    } else {
        let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
        tier(avg, "helles Grau", "mittleres Grau", "dunkles Grau")
    }
}

/// Coarse dative-case color phrase used inside the cinematic prose
/// ("in lebendigem Gelb"). Only the first hex byte is inspected.
pub fn cinematic_color_description(hex: &str) -> &'static str {
    let upper = hex.to_uppercase();
    let starts = |prefixes: &[&str]| prefixes.iter().any(|p| upper.starts_with(p));

    if starts(&["#FF"]) {
        "lebendigem Gelb"
    } else if starts(&["#00"]) {
        "tiefem Blau"
    } else if starts(&["#DC", "#EF"]) {
        "kräftigem Rot"
    } else if starts(&["#10", "#05"]) {
        "frischem Grün"
    } else if starts(&["#7C", "#8B"]) {
        "lebendigem Violett"
    } else if starts(&["#F5"]) {
        "warmem Orange"
    } else {
        "professioneller Farbe"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_color_is_case_insensitive() {
        assert_eq!(hex_to_color_description("#005EA5"), "tiefes Unternehmensblau");
        assert_eq!(hex_to_color_description("#ffc20e"), "lebendiges Akzentgelb");
    }

    #[test]
    fn test_dominant_channel_classification() {
        assert_eq!(hex_to_color_description("#1e40af"), "kräftiges Blau");
        assert_eq!(hex_to_color_description("#dc2626"), "helles Rot");
        assert_eq!(hex_to_color_description("#103010"), "dunkles Grün");
    }

    #[test]
    fn test_gray_by_average() {
        assert_eq!(hex_to_color_description("#777777"), "mittleres Grau");
        assert_eq!(hex_to_color_description("#dddddd"), "helles Grau");
    }

    #[test]
    fn test_short_hex_is_expanded() {
        // #f00 → #ff0000
        assert_eq!(hex_to_color_description("#f00"), "helles Rot");
    }

    #[test]
    fn test_unparsable_color_falls_back_to_label() {
        assert_eq!(hex_to_color_description("#zzzzzz"), "Farbe #zzzzzz");
        assert_eq!(hex_to_color_description("blue"), "Farbe blue");
    }

    #[test]
    fn test_cinematic_prefix_rules() {
        assert_eq!(cinematic_color_description("#ffc20e"), "lebendigem Gelb");
        assert_eq!(cinematic_color_description("#005EA5"), "tiefem Blau");
        assert_eq!(cinematic_color_description("#EF4444"), "kräftigem Rot");
        assert_eq!(cinematic_color_description("#B4D9F7"), "professioneller Farbe");
    }

    #[test]
    fn test_from_map_keeps_valid_and_defaults_invalid() {
        let mut map = BTreeMap::new();
        map.insert("primary".to_string(), "#123456".to_string());
        map.insert("accent".to_string(), "red".to_string());

        let colors = CiColors::from_map(&map);
        assert_eq!(colors.primary, "#123456");
        assert_eq!(colors.accent, DEFAULT_ACCENT, "invalid accent should be replaced");
        assert_eq!(colors.secondary, DEFAULT_SECONDARY);
    }

    #[test]
    fn test_is_valid_hex_shapes() {
        assert!(is_valid_hex("#fff"));
        assert!(is_valid_hex("#FFFFFF"));
        assert!(!is_valid_hex("FFFFFF"));
        assert!(!is_valid_hex("#FFFF"));
    }
}
