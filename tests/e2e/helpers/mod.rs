use anyhow::Result;
use assistant_gateway::controllers::{
    chat::ChatController, health::HealthController, image::ImageController,
    usage::UsageController,
};
use assistant_gateway::domain::{
    chat::ChatService,
    failover::{FailoverEngine, RetryPolicy},
    image::ImageService,
    usage::{ResetPeriod, UsageService},
};
use assistant_gateway::infrastructure::config::{Config, Environment, LogFormat, ModelSet};
use assistant_gateway::infrastructure::http::{build_router, Controllers};
use assistant_gateway::infrastructure::providers::{ChatProvider, ImageProvider};
use assistant_gateway::infrastructure::repositories::{CachedConversationStore, UsageRepository};
use axum::Router;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio::net::TcpListener;

pub mod fixtures;

use api_client::TestClient;
use db_pool::{DatabasePool, PooledDatabase};
use fakes::FakeProvider;
use fixtures::TestFixtures;

pub const PRIMARY_ANSWER: &str = "Hello from the primary provider";
pub const VENDOR_IMAGE_URL: &str = "https://images.test/generated.png";

// Docker client for test containers
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

// Shared PostgreSQL container for all tests
static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(SharedContainer::new);

// Global database pool
static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Shared container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

/// Provider chains wired into a test server
pub struct Chains {
    pub chat: Vec<Arc<FakeProvider>>,
    pub image: Vec<Arc<FakeProvider>>,
    pub emoji_fallback: bool,
}

impl Default for Chains {
    fn default() -> Self {
        Self {
            chat: vec![FakeProvider::answering("primary", 10, PRIMARY_ANSWER)],
            image: vec![FakeProvider::answering("vendor", 10, VENDOR_IMAGE_URL)],
            emoji_fallback: true,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    pub config: Config,
    pub fixtures: TestFixtures,
    _db: PooledDatabase,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            TestContext::with_chains(Chains::default())
                .await
                .expect("Failed to start test server")
        }
    }
}

impl TestContext {
    /// Start a server backed by a fresh database and the given provider chains
    pub async fn with_chains(chains: Chains) -> Result<Self> {
        let pooled_db = DB_POOL.get_database().await?;

        let mut config = test_config(&pooled_db.database_url);
        config.emoji_image_fallback = chains.emoji_fallback;

        let app = create_app(&config, pooled_db.pool.clone(), chains);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(Duration::from_millis(100)).await;

        Ok(Self {
            client: TestClient::new(&base_url),
            config,
            fixtures: TestFixtures::new(pooled_db.pool.clone()),
            _db: pooled_db,
        })
    }
}

fn test_config(database_url: &str) -> Config {
    Config {
        database_url: database_url.to_string(),
        database_max_connections: 12,
        host: "127.0.0.1".to_string(),
        port: 0, // Assigned by the OS
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        openai_api_key: None,
        groq_api_key: None,
        openai_models: ModelSet::openai_defaults(),
        groq_models: ModelSet::groq_defaults(),
        chat_max_attempts: 3,
        // Keep backoff short so retry tests stay fast
        chat_retry_base_delay_ms: 5,
        stability_api_key: None,
        huggingface_api_key: None,
        openai_use_for_images: false,
        stability_use_for_images: false,
        huggingface_use_for_images: false,
        emoji_image_fallback: true,
        usage_reset_period: ResetPeriod::Monthly,
        conversation_ttl_minutes: 5,
    }
}

/// Same wiring as `main`, with fake vendors in place of the configured ones
fn create_app(config: &Config, pool: PgPool, chains: Chains) -> Router {
    let pool = Arc::new(pool);

    let chat_providers: Vec<Arc<dyn ChatProvider>> = chains
        .chat
        .into_iter()
        .map(|p| p as Arc<dyn ChatProvider>)
        .collect();
    let image_providers: Vec<Arc<dyn ImageProvider>> = chains
        .image
        .into_iter()
        .map(|p| p as Arc<dyn ImageProvider>)
        .collect();

    let usage_repo = Arc::new(UsageRepository::new(pool.clone()));
    let conversation_store = Arc::new(CachedConversationStore::new(
        Duration::from_secs(config.conversation_ttl_minutes * 60),
        40,
    ));

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

    let expose_details = config.is_development();
    build_router(Controllers {
        health: Arc::new(HealthController::new(
            pool,
            chat_service.provider_names(),
            image_service.provider_names(),
        )),
        chat: Arc::new(ChatController::new(chat_service, expose_details)),
        image: Arc::new(ImageController::new(image_service, expose_details)),
        usage: Arc::new(UsageController::new(usage_service, expose_details)),
    })
}
