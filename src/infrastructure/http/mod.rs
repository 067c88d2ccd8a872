use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{
    chat::ChatController, health::HealthController, image::ImageController,
    usage::UsageController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::request_id_middleware;

/// Every controller the router serves
pub struct Controllers {
    pub chat: Arc<ChatController>,
    pub image: Arc<ImageController>,
    pub usage: Arc<UsageController>,
    pub health: Arc<HealthController>,
}

/// Build the application router with all routes and layers
pub fn build_router(controllers: Controllers) -> Router {
    let chat_routes = Router::new()
        .route("/api/chat", post(ChatController::chat))
        .with_state(controllers.chat);

    let image_routes = Router::new()
        .route("/api/image", post(ImageController::generate))
        .with_state(controllers.image);

    let usage_routes = Router::new()
        .route("/api/usage/track", post(UsageController::track))
        .route("/api/usage/limits", get(UsageController::limits))
        .with_state(controllers.usage);

    let health_routes = Router::new()
        .route("/health", get(HealthController::health))
        .route("/health/ready", get(HealthController::ready))
        .with_state(controllers.health);

    Router::new()
        .merge(health_routes)
        .merge(chat_routes)
        .merge(image_routes)
        .merge(usage_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Bind and serve until the process is stopped
pub async fn start_http_server(
    config: &Config,
    router: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;

    Ok(())
}
