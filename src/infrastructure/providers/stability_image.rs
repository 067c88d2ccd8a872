use super::error::{parse_retry_after, ProviderError, ProviderErrorKind};
use super::provider::{GeneratedImage, ImageProvider, Provider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const STABILITY_TEXT_TO_IMAGE_URL: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-v1-6/text-to-image";

/// Stability AI text-to-image
pub struct StabilityImageProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    text_prompts: [TextPrompt<'a>; 1],
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

#[derive(Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: String,
}

impl StabilityImageProvider {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(90)).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: STABILITY_TEXT_TO_IMAGE_URL.to_string(),
        })
    }

    /// First artifact as a PNG data URL
    fn parse_artifacts(body: &str) -> Result<GeneratedImage, ProviderError> {
        let response: TextToImageResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::ServiceUnavailable,
                format!("unreadable Stability response: {e}"),
            )
        })?;

        response
            .artifacts
            .into_iter()
            .next()
            .map(|artifact| GeneratedImage {
                url: format!("data:image/png;base64,{}", artifact.base64),
            })
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::ServiceUnavailable, "no artifacts returned")
            })
    }
}

impl Provider for StabilityImageProvider {
    fn name(&self) -> &str {
        "Stability AI"
    }

    fn priority(&self) -> u32 {
        20
    }
}

#[async_trait]
impl ImageProvider for StabilityImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let payload = TextToImageRequest {
            text_prompts: [TextPrompt { text: prompt }],
            cfg_scale: 7,
            height: 1024,
            width: 1024,
            samples: 1,
            steps: 30,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        if !status.is_success() {
            return Err(ProviderError::from_status(status.as_u16(), &body).with_retry_after(retry_after));
        }

        Self::parse_artifacts(&body)
    }
}
