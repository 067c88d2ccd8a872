pub mod dto;
pub mod error;
pub mod offline;
pub mod service;

pub use dto::{ChatRequest, ChatResponse};
pub use error::ChatServiceError;
pub use offline::{OfflineResponder, OFFLINE_PROVIDER};
pub use service::{ChatService, ChatServiceApi, MAX_HISTORY_MESSAGES};
