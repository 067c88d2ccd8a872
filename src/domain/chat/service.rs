use super::{
    dto::{ChatRequest, ChatResponse},
    error::ChatServiceError,
    offline::{OfflineResponder, OFFLINE_PROVIDER},
};
use crate::domain::failover::{FailoverEngine, FailoverError};
use crate::domain::prompt::{ChatMessage, Mode, PromptComposer};
use crate::domain::usage::{parse_user_id, ResourceType, UsageService};
use crate::infrastructure::providers::{ChatProvider, CompletionRequest};
use crate::infrastructure::repositories::ConversationStore;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Most recent history entries forwarded to a provider
pub const MAX_HISTORY_MESSAGES: usize = 20;

pub struct ChatService {
    usage: Arc<UsageService>,
    providers: Vec<Arc<dyn ChatProvider>>,
    engine: FailoverEngine,
    conversations: Arc<dyn ConversationStore>,
    composer: PromptComposer,
    offline: OfflineResponder,
}

impl ChatService {
    pub fn new(
        usage: Arc<UsageService>,
        providers: Vec<Arc<dyn ChatProvider>>,
        engine: FailoverEngine,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            usage,
            providers,
            engine,
            conversations,
            composer: PromptComposer::new(),
            offline: OfflineResponder::new(),
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

#[async_trait]
pub trait ChatServiceApi: Send + Sync {
    /// Answer one chat turn.
    ///
    /// This operation:
    /// - Rejects requests without a message or user
    /// - Counts the turn against the user's plan before any provider is contacted
    /// - Walks the provider chain, falling back to offline answers when it fails
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatServiceError>;
}

#[async_trait]
impl ChatServiceApi for ChatService {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatServiceError> {
        // 1. Validate
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatServiceError::Invalid("Message is required".to_string()));
        }
        let user_id = parse_user_id(request.user_id.as_deref())?;

        tracing::info!(
            user_id = %user_id,
            mode = ?request.mode,
            command = ?request.command,
            history_len = request.history.len(),
            "Chat request"
        );

        // 2. Quota gate; no refund if the providers fail afterwards
        let resource = match request.mode {
            Mode::Coding => ResourceType::Code,
            _ => ResourceType::Message,
        };
        self.usage.require(user_id, resource).await?;

        // 3. History: client transcript wins over the session store
        let history = self.load_history(user_id, &request).await;

        // 4. Compose
        let composed = self
            .composer
            .compose(&request.prompt_options(), &history, message);
        let completion_request = CompletionRequest {
            mode: request.mode,
            messages: composed.messages,
        };

        // 5. Provider chain
        let outcome = self
            .engine
            .run(&self.providers, |provider| {
                let req = &completion_request;
                async move { provider.complete(req).await }
            })
            .await;

        let response = match outcome {
            Ok(success) => ChatResponse {
                response: success.value.text,
                provider: success.provider,
                tokens_consumed: success.value.tokens_used,
            },
            Err(FailoverError::Aborted { error, .. }) => {
                return Err(ChatServiceError::Provider(error));
            }
            Err(err) => self.fallback(message, &request, err)?,
        };

        // 6. Remember the turn
        if let Some(session_id) = request.session_id.as_deref() {
            self.conversations
                .append(
                    user_id,
                    session_id,
                    vec![
                        ChatMessage::user(message),
                        ChatMessage::assistant(response.response.clone()),
                    ],
                )
                .await;
        }

        Ok(response)
    }
}

impl ChatService {
    async fn load_history(&self, user_id: Uuid, request: &ChatRequest) -> Vec<ChatMessage> {
        let history = match (&request.session_id, request.history.is_empty()) {
            (Some(session_id), true) => self.conversations.history(user_id, session_id).await,
            _ => request.history.clone(),
        };

        let skip = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        history.into_iter().skip(skip).collect()
    }

    fn fallback(
        &self,
        message: &str,
        request: &ChatRequest,
        err: FailoverError,
    ) -> Result<ChatResponse, ChatServiceError> {
        if let Some(answer) = self.offline.answer(message, request.command) {
            tracing::info!("Answered offline after provider chain failed");
            return Ok(ChatResponse {
                response: answer,
                provider: OFFLINE_PROVIDER.to_string(),
                tokens_consumed: None,
            });
        }

        match err {
            FailoverError::Exhausted {
                last_error: Some(error),
                ..
            }
            | FailoverError::Aborted { error, .. } => Err(ChatServiceError::Provider(error)),
            FailoverError::NoProviders | FailoverError::Exhausted { last_error: None, .. } => {
                Err(ChatServiceError::NoProviderConfigured)
            }
        }
    }
}
