use super::error::{parse_retry_after, ProviderError, ProviderErrorKind};
use super::provider::{ChatProvider, Completion, CompletionRequest, Provider};
use crate::infrastructure::config::ModelSet;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
pub const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 800;

/// Settings for one OpenAI-compatible chat completions endpoint
#[derive(Clone)]
pub struct OpenAiCompatibleConfig {
    pub name: String,
    pub priority: u32,
    pub base_url: String,
    pub api_key: String,
    pub models: ModelSet,
    pub timeout: Duration,
}

impl OpenAiCompatibleConfig {
    pub fn openai(api_key: String, models: ModelSet) -> Self {
        Self {
            name: "OpenAI".to_string(),
            priority: 10,
            base_url: OPENAI_API_BASE.to_string(),
            api_key,
            models,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn groq(api_key: String, models: ModelSet) -> Self {
        Self {
            name: "Groq (Llama)".to_string(),
            priority: 20,
            base_url: GROQ_API_BASE.to_string(),
            api_key,
            models,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat provider speaking the `/chat/completions` protocol (OpenAI, Groq).
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn parse_completion(body: &str) -> Result<Completion, ProviderError> {
        let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::ServiceUnavailable,
                format!("unreadable completion: {e}"),
            )
        })?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::ServiceUnavailable, "empty completion")
            })?;

        Ok(Completion {
            text,
            tokens_used: response.usage.map(|u| u.total_tokens),
        })
    }
}

impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> u32 {
        self.config.priority
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let model = self.config.models.for_mode(request.mode);
        let payload = ChatCompletionRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(
            provider = %self.config.name,
            model = model,
            message_count = payload.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
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

        Self::parse_completion(&body)
    }
}
