use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::infrastructure::db::{check_connection, DbPool};

pub struct HealthController {
    pool: Arc<DbPool>,
    chat_providers: Vec<String>,
    image_providers: Vec<String>,
}

impl HealthController {
    pub fn new(pool: Arc<DbPool>, chat_providers: Vec<String>, image_providers: Vec<String>) -> Self {
        Self {
            pool,
            chat_providers,
            image_providers,
        }
    }

    /// GET /health
    pub async fn health() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// GET /health/ready - Database reachability plus the configured provider chains
    pub async fn ready(State(controller): State<Arc<HealthController>>) -> impl IntoResponse {
        let providers = json!({
            "chat": controller.chat_providers,
            "image": controller.image_providers,
        });

        match check_connection(&controller.pool).await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "database": "connected",
                    "providers": providers
                })),
            ),
            Err(e) => {
                tracing::error!(error = %e, "Readiness check failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "status": "not_ready",
                        "database": "disconnected",
                        "providers": providers
                    })),
                )
            }
        }
    }
}
