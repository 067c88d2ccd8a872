use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use assistant_gateway::controllers::{
    chat::ChatController, health::HealthController, image::ImageController,
    usage::UsageController,
};
use assistant_gateway::domain::{
    chat::ChatService,
    failover::{FailoverEngine, RetryPolicy},
    image::ImageService,
    usage::UsageService,
};
use assistant_gateway::infrastructure::config::{Config, LogFormat};
use assistant_gateway::infrastructure::db::{check_connection, create_pool};
use assistant_gateway::infrastructure::http::{build_router, start_http_server, Controllers};
use assistant_gateway::infrastructure::providers::{build_chat_providers, build_image_providers};
use assistant_gateway::infrastructure::repositories::{CachedConversationStore, UsageRepository};

/// Messages kept per conversation session
const MAX_SESSION_MESSAGES: usize = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Assistant Gateway on {}:{}",
        config.host,
        config.port
    );
    tracing::debug!(config = ?config, "Configuration loaded");

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connection verified and migrations applied");

    let pool = Arc::new(pool);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Provider chains
    let chat_providers = build_chat_providers(&config)?;
    let image_providers = build_image_providers(&config)?;
    if chat_providers.is_empty() {
        tracing::warn!("No chat provider configured; only offline answers are available");
    }

    // 2. Repositories
    tracing::info!("Instantiating repositories...");
    let usage_repo = Arc::new(UsageRepository::new(pool.clone()));
    let conversation_store = Arc::new(CachedConversationStore::new(
        Duration::from_secs(config.conversation_ttl_minutes * 60),
        MAX_SESSION_MESSAGES,
    ));

    // 3. Services
    tracing::info!("Instantiating services...");
    let usage_service = Arc::new(UsageService::new(usage_repo, config.usage_reset_period));
    let chat_service = Arc::new(ChatService::new(
        usage_service.clone(),
        chat_providers,
        FailoverEngine::new(RetryPolicy::chat(
            config.chat_max_attempts,
            Duration::from_millis(config.chat_retry_base_delay_ms),
        )),
        conversation_store,
    ));
    let image_service = Arc::new(ImageService::new(
        usage_service.clone(),
        image_providers,
        config.emoji_image_fallback,
    ));

    tracing::info!(
        chat_providers = ?chat_service.provider_names(),
        image_providers = ?image_service.provider_names(),
        "Provider chains ready"
    );

    // 4. Controllers
    tracing::info!("Instantiating controllers...");
    let expose_details = config.is_development();
    let controllers = Controllers {
        health: Arc::new(HealthController::new(
            pool.clone(),
            chat_service.provider_names(),
            image_service.provider_names(),
        )),
        chat: Arc::new(ChatController::new(chat_service, expose_details)),
        image: Arc::new(ImageController::new(image_service, expose_details)),
        usage: Arc::new(UsageController::new(usage_service, expose_details)),
    };

    // Start HTTP server with all routes
    start_http_server(&config, build_router(controllers)).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assistant_gateway=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
