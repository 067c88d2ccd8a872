use crate::domain::prompt::{ChatMessage, Command, Mode, Mood, PromptOptions};
use serde::{Deserialize, Serialize};

/// Request for POST /api/chat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub mode: Mode,
    pub command: Option<Command>,
    pub mood: Mood,
    pub simple_language: bool,
    pub error_free_mode: bool,
    pub user_id: Option<String>,
    /// Read history from the server-side store when `history` is empty
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn prompt_options(&self) -> PromptOptions {
        PromptOptions {
            mode: self.mode,
            mood: self.mood,
            command: self.command,
            simple_language: self.simple_language,
            error_free_mode: self.error_free_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_consumed: Option<u32>,
}
