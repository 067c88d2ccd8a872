use super::error::{mentions_quota, ProviderError, ProviderErrorKind};
use super::provider::{GeneratedImage, ImageProvider, Provider};
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateImageRequestArgs, Image, ImageModel, ImageSize},
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

/// OpenAI image model (DALL-E 3) behind the image provider interface
pub struct OpenAiImageProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiImageProvider {
    pub fn new(api_key: String) -> Self {
        // The failover chain decides about retries; the SDK must give up after one call.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key))
            .with_backoff(no_retry);

        Self { client }
    }
}

impl Provider for OpenAiImageProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    fn priority(&self) -> u32 {
        10
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(ImageModel::DallE3)
            .size(ImageSize::S1024x1024)
            .n(1)
            .build()
            .map_err(classify_openai_error)?;

        tracing::info!(prompt_length = prompt.len(), "Calling OpenAI image generation");

        let response = self
            .client
            .images()
            .create(request)
            .await
            .map_err(classify_openai_error)?;

        let url = response
            .data
            .first()
            .map(|image| match image.as_ref() {
                Image::Url { url, .. } => url.clone(),
                Image::B64Json { b64_json, .. } => format!("data:image/png;base64,{}", b64_json),
            })
            .ok_or_else(|| {
                ProviderError::new(
                    ProviderErrorKind::ServiceUnavailable,
                    "Image generation failed: no URL returned",
                )
            })?;

        Ok(GeneratedImage { url })
    }
}

/// The SDK hides status codes, so classification relies on the error code and type.
fn classify_openai_error(err: OpenAIError) -> ProviderError {
    match err {
        OpenAIError::ApiError(api) => {
            let code = api.code.as_ref().map(|c| c.to_string()).unwrap_or_default();
            let kind = classify_api_error(&code, api.r#type.as_deref().unwrap_or(""), &api.message);
            ProviderError::new(kind, api.message)
        }
        OpenAIError::InvalidArgument(msg) => ProviderError::new(ProviderErrorKind::InvalidRequest, msg),
        other => ProviderError::new(ProviderErrorKind::ServiceUnavailable, other.to_string()),
    }
}

fn classify_api_error(code: &str, error_type: &str, message: &str) -> ProviderErrorKind {
    let haystack = format!("{code} {error_type}").to_lowercase();

    if mentions_quota(&haystack) || mentions_quota(message) {
        ProviderErrorKind::QuotaExceeded
    } else if haystack.contains("invalid_api_key")
        || haystack.contains("authentication")
        || haystack.contains("permission")
    {
        ProviderErrorKind::Auth
    } else if haystack.contains("rate_limit") || haystack.contains("requests") {
        ProviderErrorKind::RateLimited
    } else if haystack.contains("server_error") || haystack.contains("overloaded") {
        ProviderErrorKind::ServiceUnavailable
    } else if haystack.contains("invalid_request")
        || haystack.contains("content_policy")
        || haystack.contains("invalid")
    {
        ProviderErrorKind::InvalidRequest
    } else {
        ProviderErrorKind::ServiceUnavailable
    }
}
