use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: igrelay.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "igrelay.log".to_string()));

/// Custom Bot API server URL (local telegram-bot-api instance)
/// Read from BOT_API_URL environment variable
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| env::var("BOT_API_URL").ok());

/// Network configuration
pub mod network {
    use super::Duration;

    /// Timeout for fetching a post page in the scraping resolver (in seconds)
    pub const PAGE_TIMEOUT_SECS: u64 = 50;

    /// Timeout for structured metadata requests (in seconds)
    pub const API_TIMEOUT_SECS: u64 = 30;

    /// Total timeout for a single media download (in seconds)
    pub const MEDIA_TIMEOUT_SECS: u64 = 30;

    /// Connect timeout shared by all outbound HTTP clients (in seconds)
    pub const CONNECT_TIMEOUT_SECS: u64 = 15;

    /// Request timeout for Bot API calls (in seconds)
    /// Uploads of large videos go through the same client, so this is generous
    pub const BOT_API_TIMEOUT_SECS: u64 = 300;

    pub fn connect_timeout() -> Duration {
        Duration::from_secs(CONNECT_TIMEOUT_SECS)
    }

    pub fn bot_api_timeout() -> Duration {
        Duration::from_secs(BOT_API_TIMEOUT_SECS)
    }
}

/// Download configuration
pub mod download {
    /// Buffer size used while streaming media to disk (in bytes)
    pub const CHUNK_SIZE: usize = 8192;
}

/// Instagram endpoints and client identity
pub mod instagram {
    /// Origin used to build post page URLs
    pub const BASE_URL: &str = "https://www.instagram.com";

    /// Instagram GraphQL API endpoint.
    pub const GRAPHQL_ENDPOINT: &str = "https://www.instagram.com/api/graphql";

    /// Persisted query id for the shortcode media lookup (rotates every few weeks)
    pub const DOC_ID: &str = "8845758582119845";

    /// Desktop browser identity sent with page, API and media requests
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
}

/// Errors raised while loading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither BOT_TOKEN nor TELOXIDE_TOKEN is set
    #[error("bot token not found: set BOT_TOKEN (or TELOXIDE_TOKEN) in the environment or .env file")]
    MissingToken,

    /// A value that must be parsed is malformed
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Which media resolution backend a batch uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverKind {
    /// Instagram GraphQL API (carousel aware)
    #[default]
    Structured,
    /// Pattern matching over the raw post page (single item)
    Scraping,
    /// Structured first, scraping when the API path fails
    Fallback,
}

impl ResolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Scraping => "scraping",
            Self::Fallback => "fallback",
        }
    }
}

impl FromStr for ResolverKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "graphql" | "api" => Ok(Self::Structured),
            "scraping" | "scrape" | "page" => Ok(Self::Scraping),
            "fallback" => Ok(Self::Fallback),
            _ => Err(ConfigError::InvalidValue {
                key: "RESOLVER",
                value: s.to_string(),
            }),
        }
    }
}

/// Everything one batch run needs, resolved once at startup and injected into
/// the batch controller.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub resolver: ResolverKind,
    pub page_timeout: Duration,
    pub api_timeout: Duration,
    pub media_timeout: Duration,
    pub chunk_size: usize,
    /// Parent directory for per-batch working directories
    pub temp_root: PathBuf,
    pub instagram_base_url: String,
    pub graphql_endpoint: String,
    pub doc_id: String,
    pub user_agent: String,
    /// Abort the remaining items after the first failed one
    pub stop_on_item_failure: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::default(),
            page_timeout: Duration::from_secs(network::PAGE_TIMEOUT_SECS),
            api_timeout: Duration::from_secs(network::API_TIMEOUT_SECS),
            media_timeout: Duration::from_secs(network::MEDIA_TIMEOUT_SECS),
            chunk_size: download::CHUNK_SIZE,
            temp_root: env::temp_dir(),
            instagram_base_url: instagram::BASE_URL.to_string(),
            graphql_endpoint: instagram::GRAPHQL_ENDPOINT.to_string(),
            doc_id: instagram::DOC_ID.to_string(),
            user_agent: instagram::USER_AGENT.to_string(),
            stop_on_item_failure: false,
        }
    }
}

impl PipelineConfig {
    /// Read the pipeline settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset or empty keys keep their
    /// defaults; malformed numbers fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(kind) = get("RESOLVER") {
            config.resolver = kind.parse()?;
        }

        config.page_timeout = secs_or(get("PAGE_TIMEOUT_SECS"), "PAGE_TIMEOUT_SECS", config.page_timeout);
        config.api_timeout = secs_or(get("API_TIMEOUT_SECS"), "API_TIMEOUT_SECS", config.api_timeout);
        config.media_timeout = secs_or(get("MEDIA_TIMEOUT_SECS"), "MEDIA_TIMEOUT_SECS", config.media_timeout);

        if let Some(raw) = get("DOWNLOAD_CHUNK_SIZE") {
            match raw.parse::<usize>() {
                Ok(size) if size > 0 => config.chunk_size = size,
                _ => log::warn!("Ignoring invalid DOWNLOAD_CHUNK_SIZE={}, using {}", raw, config.chunk_size),
            }
        }

        if let Some(dir) = get("TEMP_FILES_DIR") {
            config.temp_root = PathBuf::from(shellexpand::tilde(&dir).to_string());
        }
        if let Some(base) = get("INSTAGRAM_BASE_URL") {
            config.instagram_base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(endpoint) = get("INSTAGRAM_GRAPHQL_URL") {
            config.graphql_endpoint = endpoint;
        }
        if let Some(doc_id) = get("INSTAGRAM_DOC_ID") {
            config.doc_id = doc_id;
        }
        if let Some(agent) = get("USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(flag) = get("STOP_ON_ITEM_FAILURE") {
            config.stop_on_item_failure = match flag.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "STOP_ON_ITEM_FAILURE",
                        value: flag,
                    })
                }
            };
        }

        Ok(config)
    }
}

fn secs_or(raw: Option<String>, key: &str, default: Duration) -> Duration {
    match raw {
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                log::warn!("Ignoring invalid {}={}, using {}s", key, value, default.as_secs());
                default
            }
        },
        None => default,
    }
}

/// Process-wide bot settings: the access token plus the pipeline config.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: SecretString,
    pub api_url: Option<String>,
    pub pipeline: PipelineConfig,
}

impl BotConfig {
    /// Load the bot configuration. A missing token is fatal.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = env::var("BOT_TOKEN")
            .or_else(|_| env::var("TELOXIDE_TOKEN"))
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        Ok(Self {
            token: SecretString::from(token),
            api_url: BOT_API_URL.clone().filter(|u| !u.trim().is_empty()),
            pipeline: PipelineConfig::from_env()?,
        })
    }
}
