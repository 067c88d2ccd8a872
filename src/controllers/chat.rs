use axum::{extract::State, Json};
use std::sync::Arc;

use super::{public_error, JsonBody};
use crate::{
    domain::chat::{ChatRequest, ChatResponse, ChatService, ChatServiceApi},
    error::AppResult,
};

pub struct ChatController {
    chat_service: Arc<ChatService>,
    expose_error_details: bool,
}

impl ChatController {
    pub fn new(chat_service: Arc<ChatService>, expose_error_details: bool) -> Self {
        Self {
            chat_service,
            expose_error_details,
        }
    }

    /// POST /api/chat - Answer one chat turn
    pub async fn chat(
        State(controller): State<Arc<ChatController>>,
        JsonBody(request): JsonBody<ChatRequest>,
    ) -> AppResult<Json<ChatResponse>> {
        let response = controller
            .chat_service
            .chat(request)
            .await
            .map_err(|e| public_error(e.into(), controller.expose_error_details))?;

        Ok(Json(response))
    }
}
