use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::workflow::{DEFAULT_MAX_ATTEMPTS, DEFAULT_TARGET_SCORE};

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional: without it every OpenAI call fails and callers fall back.
    pub openai_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub output_dir: PathBuf,
    /// Overrides the embedded layout catalog.
    pub layouts_path: Option<PathBuf>,
    pub target_quality_score: u32,
    pub max_attempts: u32,
    pub styled_image_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_dir: optional_env("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("outputs")),
            layouts_path: optional_env("LAYOUTS_PATH").map(PathBuf::from),
            target_quality_score: parse_env("TARGET_QUALITY_SCORE", DEFAULT_TARGET_SCORE)?,
            max_attempts: parse_env("MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            styled_image_model: optional_env("STYLED_IMAGE_MODEL")
                .unwrap_or_else(|| "dall-e-3".to_string()),
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env(key: &str, default: u32) -> Result<u32> {
    match optional_env(key) {
        Some(value) => value
            .trim()
            .parse::<u32>()
            .with_context(|| format!("{key} must be a non-negative integer, got '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_error() {
        assert_eq!(parse_env("CREATIVE_API_TEST_UNSET_VAR", 85).unwrap(), 85);

        std::env::set_var("CREATIVE_API_TEST_BAD_NUMBER", "viele");
        let err = parse_env("CREATIVE_API_TEST_BAD_NUMBER", 3).unwrap_err();
        assert!(err.to_string().contains("CREATIVE_API_TEST_BAD_NUMBER must be"));
        std::env::remove_var("CREATIVE_API_TEST_BAD_NUMBER");
    }
}
