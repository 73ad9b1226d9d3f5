/// Image client: HTTP wrapper around the OpenAI image generation endpoint.
///
/// Generators depend on [`ImageBackend`], never on reqwest directly.
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const OPENAI_IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const GENERATE_TIMEOUT: Duration = Duration::from_secs(180);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no image data in API response")]
    EmptyResponse,

    #[error("base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
    pub quality: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub n: u32,
}

/// Either `url` or `b64_json` is set on a successful response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, ImageError>;
    async fn download(&self, url: &str) -> Result<Bytes, ImageError>;
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiImageClient {
    client: Client,
    api_key: Option<String>,
}

impl OpenAiImageClient {
    pub fn new(api_key: Option<String>) -> Result<Self, ImageError> {
        Ok(Self {
            client: Client::builder().timeout(GENERATE_TIMEOUT).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl ImageBackend for OpenAiImageClient {
    async fn generate(&self, request: &ImageRequest) -> Result<GeneratedImage, ImageError> {
        let api_key = self.api_key.as_deref().ok_or(ImageError::MissingApiKey)?;

        info!(
            model = %request.model,
            size = %request.size,
            quality = %request.quality,
            prompt_len = request.prompt.chars().count(),
            "Image generation request"
        );

        let response = self
            .client
            .post(OPENAI_IMAGES_URL)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        first_image(&body)
    }

    async fn download(&self, url: &str) -> Result<Bytes, ImageError> {
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes)
    }
}

fn first_image(body: &str) -> Result<GeneratedImage, ImageError> {
    let parsed: ImagesResponse = serde_json::from_str(body).map_err(|e| ImageError::Api {
        status: 200,
        message: format!("unreadable response: {e}"),
    })?;
    parsed
        .data
        .into_iter()
        .next()
        .filter(|img| img.url.is_some() || img.b64_json.is_some())
        .ok_or(ImageError::EmptyResponse)
}

fn api_error_message(body: String) -> String {
    serde_json::from_str::<OpenAiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_image_prefers_first_entry() {
        let body = r#"{"created":1,"data":[{"url":"https://img/1.png","revised_prompt":"rev"},{"url":"https://img/2.png"}]}"#;
        let image = first_image(body).unwrap();
        assert_eq!(image.url.as_deref(), Some("https://img/1.png"));
        assert_eq!(image.revised_prompt.as_deref(), Some("rev"));
    }

    #[test]
    fn test_first_image_accepts_base64() {
        let image = first_image(r#"{"data":[{"b64_json":"aGVsbG8="}]}"#).unwrap();
        assert!(image.url.is_none());
        assert_eq!(image.b64_json.as_deref(), Some("aGVsbG8="));
    }

    #[test]
    fn test_first_image_rejects_empty() {
        assert!(matches!(first_image(r#"{"data":[]}"#), Err(ImageError::EmptyResponse)));
        assert!(matches!(first_image(r#"{"data":[{}]}"#), Err(ImageError::EmptyResponse)));
    }

    #[test]
    fn test_request_omits_missing_style() {
        let request = ImageRequest {
            model: "dall-e-3".to_string(),
            prompt: "p".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            style: None,
            n: 1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("style").is_none());
        assert_eq!(json["n"], 1);
    }

    #[tokio::test]
    async fn test_generate_without_key() {
        let client = OpenAiImageClient::new(None).unwrap();
        let request = ImageRequest {
            model: "dall-e-3".to_string(),
            prompt: "p".to_string(),
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
            style: Some("natural".to_string()),
            n: 1,
        };
        assert!(matches!(client.generate(&request).await, Err(ImageError::MissingApiKey)));
    }
}
