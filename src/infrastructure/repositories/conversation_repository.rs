use crate::domain::prompt::ChatMessage;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Server-side history for clients that send a `sessionId` instead of the full transcript
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn history(&self, user_id: Uuid, session_id: &str) -> Vec<ChatMessage>;

    async fn append(&self, user_id: Uuid, session_id: &str, messages: Vec<ChatMessage>);
}

/// moka-backed store. Sessions expire after `ttl` without access.
pub struct CachedConversationStore {
    cache: Cache<String, Arc<Vec<ChatMessage>>>,
    max_messages: usize,
}

impl CachedConversationStore {
    pub fn new(ttl: Duration, max_messages: usize) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(ttl)
            .build();

        Self {
            cache,
            max_messages,
        }
    }

    fn key(user_id: Uuid, session_id: &str) -> String {
        format!("{user_id}:{session_id}")
    }
}

#[async_trait]
impl ConversationStore for CachedConversationStore {
    async fn history(&self, user_id: Uuid, session_id: &str) -> Vec<ChatMessage> {
        self.cache
            .get(&Self::key(user_id, session_id))
            .await
            .map(|messages| messages.as_ref().clone())
            .unwrap_or_default()
    }

    async fn append(&self, user_id: Uuid, session_id: &str, messages: Vec<ChatMessage>) {
        let max = self.max_messages;

        self.cache
            .entry(Self::key(user_id, session_id))
            .and_upsert_with(|existing| {
                let mut history = existing
                    .map(|entry| entry.into_value().as_ref().clone())
                    .unwrap_or_default();
                history.extend(messages);
                if history.len() > max {
                    history.drain(..history.len() - max);
                }
                std::future::ready(Arc::new(history))
            })
            .await;
    }
}
