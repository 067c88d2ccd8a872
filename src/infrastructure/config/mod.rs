use crate::domain::prompt::Mode;
use crate::domain::usage::ResetPeriod;
use std::env;
use std::fmt;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Chat providers
    pub openai_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub openai_models: ModelSet,
    pub groq_models: ModelSet,
    pub chat_max_attempts: u32,
    pub chat_retry_base_delay_ms: u64,
    // Image providers
    pub stability_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
    pub openai_use_for_images: bool,
    pub stability_use_for_images: bool,
    pub huggingface_use_for_images: bool,
    pub emoji_image_fallback: bool,
    // Usage ledger
    pub usage_reset_period: ResetPeriod,
    // Session history
    pub conversation_ttl_minutes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Model names per chat mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSet {
    pub fast: String,
    pub detailed: String,
    pub coding: String,
}

impl ModelSet {
    pub fn for_mode(&self, mode: Mode) -> &str {
        match mode {
            Mode::Fast => &self.fast,
            Mode::Detailed => &self.detailed,
            Mode::Coding => &self.coding,
        }
    }

    /// Read `<PREFIX>_MODEL_FAST|DETAILED|CODING`, falling back to `<PREFIX>_MODEL`
    /// for the detailed and coding models and to the given defaults after that.
    fn from_env(prefix: &str, fast: &str, detailed: &str, coding: &str) -> Self {
        let shared = optional_env(&format!("{prefix}_MODEL"));
        Self {
            fast: optional_env(&format!("{prefix}_MODEL_FAST")).unwrap_or_else(|| fast.to_string()),
            detailed: optional_env(&format!("{prefix}_MODEL_DETAILED"))
                .or_else(|| shared.clone())
                .unwrap_or_else(|| detailed.to_string()),
            coding: optional_env(&format!("{prefix}_MODEL_CODING"))
                .or(shared)
                .unwrap_or_else(|| coding.to_string()),
        }
    }

    pub fn openai_defaults() -> Self {
        Self {
            fast: "gpt-3.5-turbo".to_string(),
            detailed: "gpt-4o-mini".to_string(),
            coding: "gpt-4o-mini".to_string(),
        }
    }

    pub fn groq_defaults() -> Self {
        Self {
            fast: "llama-3.1-8b-instant".to_string(),
            detailed: "llama-3.1-70b-versatile".to_string(),
            coding: "llama-3.1-8b-instant".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let openai_defaults = ModelSet::openai_defaults();
        let groq_defaults = ModelSet::groq_defaults();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            openai_api_key: optional_env("OPENAI_API_KEY"),
            groq_api_key: optional_env("GROQ_API_KEY"),
            openai_models: ModelSet::from_env(
                "OPENAI",
                &openai_defaults.fast,
                &openai_defaults.detailed,
                &openai_defaults.coding,
            ),
            groq_models: ModelSet::from_env(
                "GROQ",
                &groq_defaults.fast,
                &groq_defaults.detailed,
                &groq_defaults.coding,
            ),
            chat_max_attempts: env::var("CHAT_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            chat_retry_base_delay_ms: env::var("CHAT_RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
            stability_api_key: optional_env("STABILITY_API_KEY"),
            huggingface_api_key: optional_env("HUGGINGFACE_API_KEY"),
            openai_use_for_images: flag("OPENAI_USE_FOR_IMAGES", false),
            stability_use_for_images: flag("STABILITY_USE_FOR_IMAGES", false),
            huggingface_use_for_images: flag("HUGGINGFACE_USE_FOR_IMAGES", false),
            emoji_image_fallback: flag("EMOJI_IMAGE_FALLBACK", true),
            usage_reset_period: env::var("USAGE_RESET_PERIOD")
                .unwrap_or_else(|_| "monthly".to_string())
                .parse()?,
            conversation_ttl_minutes: env::var("CONVERSATION_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

// API keys never reach the logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_max_connections", &self.database_max_connections)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("log_format", &self.log_format)
            .field("openai_api_key", &self.openai_api_key.as_deref().map(mask_api_key))
            .field("groq_api_key", &self.groq_api_key.as_deref().map(mask_api_key))
            .field("stability_api_key", &self.stability_api_key.as_deref().map(mask_api_key))
            .field("huggingface_api_key", &self.huggingface_api_key.as_deref().map(mask_api_key))
            .field("openai_models", &self.openai_models)
            .field("groq_models", &self.groq_models)
            .field("chat_max_attempts", &self.chat_max_attempts)
            .field("chat_retry_base_delay_ms", &self.chat_retry_base_delay_ms)
            .field("openai_use_for_images", &self.openai_use_for_images)
            .field("stability_use_for_images", &self.stability_use_for_images)
            .field("huggingface_use_for_images", &self.huggingface_use_for_images)
            .field("emoji_image_fallback", &self.emoji_image_fallback)
            .field("usage_reset_period", &self.usage_reset_period)
            .field("conversation_ttl_minutes", &self.conversation_ttl_minutes)
            .finish_non_exhaustive()
    }
}

/// Unset and empty variables are both treated as missing
fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn flag(name: &str, default: bool) -> bool {
    optional_env(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "****".to_string();
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}
