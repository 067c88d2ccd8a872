pub mod conversation_repository;
pub mod usage_repository;

pub use conversation_repository::{CachedConversationStore, ConversationStore};
pub use usage_repository::{UsageRepository, UsageStore};
