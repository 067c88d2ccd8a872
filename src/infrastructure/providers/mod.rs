pub mod error;
pub mod huggingface_image;
pub mod openai_compatible;
pub mod openai_image;
pub mod provider;
pub mod stability_image;

pub use error::{ProviderError, ProviderErrorKind};
pub use huggingface_image::HuggingFaceImageProvider;
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use openai_image::OpenAiImageProvider;
pub use provider::{
    by_priority, ChatProvider, Completion, CompletionRequest, GeneratedImage, ImageProvider,
    Provider,
};
pub use stability_image::StabilityImageProvider;

use crate::infrastructure::config::Config;
use std::sync::Arc;

/// Chat vendors with an API key, in priority order
pub fn build_chat_providers(config: &Config) -> Result<Vec<Arc<dyn ChatProvider>>, reqwest::Error> {
    let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

    if let Some(key) = &config.openai_api_key {
        providers.push(Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::openai(key.clone(), config.openai_models.clone()),
        )?));
    }
    if let Some(key) = &config.groq_api_key {
        providers.push(Arc::new(OpenAiCompatibleProvider::new(
            OpenAiCompatibleConfig::groq(key.clone(), config.groq_models.clone()),
        )?));
    }

    Ok(by_priority(providers))
}

/// Image vendors that have a key and are switched on for images, in priority order
pub fn build_image_providers(config: &Config) -> Result<Vec<Arc<dyn ImageProvider>>, reqwest::Error> {
    let mut providers: Vec<Arc<dyn ImageProvider>> = Vec::new();

    if let (Some(key), true) = (&config.openai_api_key, config.openai_use_for_images) {
        providers.push(Arc::new(OpenAiImageProvider::new(key.clone())));
    }
    if let (Some(key), true) = (&config.stability_api_key, config.stability_use_for_images) {
        providers.push(Arc::new(StabilityImageProvider::new(key.clone())?));
    }
    if let (Some(key), true) = (&config.huggingface_api_key, config.huggingface_use_for_images) {
        providers.push(Arc::new(HuggingFaceImageProvider::new(key.clone())?));
    }

    Ok(by_priority(providers))
}
