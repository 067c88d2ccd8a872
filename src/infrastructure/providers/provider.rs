use super::error::ProviderError;
use crate::domain::prompt::{ChatMessage, Mode};
use async_trait::async_trait;
use std::sync::Arc;

/// Identity shared by every provider adapter.
///
/// Lower `priority` values are tried first.
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn priority(&self) -> u32;
}

/// Normalized chat completion input
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub mode: Mode,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: Option<u32>,
}

/// A text-completion vendor.
///
/// Implementations classify every vendor failure into a [`ProviderError`] before
/// returning, so callers never inspect vendor-specific error shapes.
#[async_trait]
pub trait ChatProvider: Provider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    /// Remote URL or `data:` URL
    pub url: String,
}

/// An image-generation vendor.
#[async_trait]
pub trait ImageProvider: Provider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, ProviderError>;
}

/// Sort providers by priority, keeping registration order for ties.
pub fn by_priority<P: Provider + ?Sized>(mut providers: Vec<Arc<P>>) -> Vec<Arc<P>> {
    providers.sort_by_key(|p| p.priority());
    providers
}
