use super::error::{parse_retry_after, ProviderError, ProviderErrorKind};
use super::provider::{GeneratedImage, ImageProvider, Provider};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub const HUGGINGFACE_MODEL_URL: &str =
    "https://api-inference.huggingface.co/models/THUDM/cogview-2";

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

/// Hugging Face inference API text-to-image model
pub struct HuggingFaceImageProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

/// JSON returned instead of image bytes, e.g. while the model is loading
#[derive(Deserialize)]
struct InferenceNotice {
    error: Option<String>,
    estimated_time: Option<f64>,
}

impl HuggingFaceImageProvider {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(90)).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: HUGGINGFACE_MODEL_URL.to_string(),
        })
    }

    /// Accept the body only when it carries a PNG or JPEG signature.
    fn decode_body(bytes: &[u8]) -> Result<GeneratedImage, ProviderError> {
        let mime = if bytes.starts_with(PNG_SIGNATURE) {
            "image/png"
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            "image/jpeg"
        } else {
            return Err(Self::not_an_image(bytes));
        };

        Ok(GeneratedImage {
            url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        })
    }

    fn not_an_image(bytes: &[u8]) -> ProviderError {
        let text = String::from_utf8_lossy(bytes);
        match serde_json::from_str::<InferenceNotice>(&text) {
            Ok(notice) => {
                let retry_after = notice
                    .estimated_time
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
                ProviderError::new(
                    ProviderErrorKind::ServiceUnavailable,
                    notice.error.unwrap_or_else(|| "response is not an image".to_string()),
                )
                .with_retry_after(retry_after)
            }
            Err(_) => ProviderError::new(
                ProviderErrorKind::ServiceUnavailable,
                format!("response is not an image: {}", text.chars().take(200).collect::<String>()),
            ),
        }
    }
}

impl Provider for HuggingFaceImageProvider {
    fn name(&self) -> &str {
        "Hugging Face"
    }

    fn priority(&self) -> u32 {
        30
    }
}

#[async_trait]
impl ImageProvider for HuggingFaceImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        tracing::info!(prompt_length = prompt.len(), "Attempting Hugging Face image generation");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes);
            return Err(ProviderError::from_status(status.as_u16(), &body).with_retry_after(retry_after));
        }

        Self::decode_body(&bytes)
    }
}
