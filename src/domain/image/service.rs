use super::{
    dto::{ImageRequest, ImageResponse},
    emoji::{emoji_svg_data_url, EmojiArtProvider, EMOJI_PROVIDER},
    error::ImageServiceError,
};
use crate::domain::failover::{FailoverEngine, FailoverError, RetryPolicy};
use crate::domain::usage::{parse_user_id, ResourceType, UsageService};
use crate::infrastructure::providers::ImageProvider;
use async_trait::async_trait;
use std::sync::Arc;

pub const PLACEHOLDER_PROVIDER: &str = "placeholder";

const PLACEHOLDER_TEXT_CHARS: usize = 20;

pub struct ImageService {
    usage: Arc<UsageService>,
    providers: Vec<Arc<dyn ImageProvider>>,
    engine: FailoverEngine,
}

impl ImageService {
    /// `vendors` must already be in priority order. The emoji generator is
    /// appended last when `emoji_fallback` is set.
    pub fn new(
        usage: Arc<UsageService>,
        vendors: Vec<Arc<dyn ImageProvider>>,
        emoji_fallback: bool,
    ) -> Self {
        let mut providers = vendors;
        if emoji_fallback {
            providers.push(Arc::new(EmojiArtProvider));
        }

        Self {
            usage,
            providers,
            engine: FailoverEngine::new(RetryPolicy::single_attempt()),
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

#[async_trait]
pub trait ImageServiceApi: Send + Sync {
    /// Generate an image for a prompt. Once the quota check passes this always
    /// returns an image, falling back to a placeholder URL.
    async fn generate(&self, request: ImageRequest) -> Result<ImageResponse, ImageServiceError>;
}

#[async_trait]
impl ImageServiceApi for ImageService {
    async fn generate(&self, request: ImageRequest) -> Result<ImageResponse, ImageServiceError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(ImageServiceError::Invalid("Prompt is required".to_string()));
        }
        let user_id = parse_user_id(request.user_id.as_deref())?;

        self.usage.require(user_id, ResourceType::Image).await?;

        if request.mode.as_deref() == Some("emoji") {
            return Ok(ImageResponse {
                image_url: emoji_svg_data_url(prompt),
                provider: EMOJI_PROVIDER.to_string(),
            });
        }

        let outcome = self
            .engine
            .run(&self.providers, |provider| async move {
                provider.generate(prompt).await
            })
            .await;

        match outcome {
            Ok(success) => Ok(ImageResponse {
                image_url: success.value.url,
                provider: success.provider,
            }),
            Err(err) => {
                let attempts = match &err {
                    FailoverError::NoProviders => 0,
                    FailoverError::Exhausted { attempts, .. }
                    | FailoverError::Aborted { attempts, .. } => attempts.len(),
                };
                tracing::warn!(user_id = %user_id, attempts, "Image chain failed, using placeholder");
                Ok(ImageResponse {
                    image_url: placeholder_url(prompt),
                    provider: PLACEHOLDER_PROVIDER.to_string(),
                })
            }
        }
    }
}

pub fn placeholder_url(prompt: &str) -> String {
    let text: String = prompt.chars().take(PLACEHOLDER_TEXT_CHARS).collect();
    format!(
        "https://via.placeholder.com/512/667eea/ffffff?text={}",
        urlencoding::encode(&text)
    )
}
