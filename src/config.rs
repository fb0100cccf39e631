//! Configuration types for hn-stories

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Environment variable naming a JSON configuration file
pub const CONFIG_PATH_ENV: &str = "HN_STORIES_CONFIG";

/// Main configuration struct for hn-stories
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream endpoints
    #[serde(default)]
    pub source: SourceConfig,

    /// Retry policy applied to every outbound call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Detail fan-out and decoding behavior
    #[serde(default)]
    pub fetch: FetchConfig,

    /// REST API settings
    #[serde(default)]
    pub server: ApiConfig,
}

/// Upstream content API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint returning the ranked id list
    #[serde(default = "default_best_stories_url")]
    pub best_stories_url: String,

    /// Base endpoint for item details; `/{id}.json` is appended
    #[serde(default = "default_item_url")]
    pub item_url: String,

    /// Timeout for a single attempt, in milliseconds (default: 10000)
    #[serde(default = "default_request_timeout", with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            best_stories_url: default_best_stories_url(),
            item_url: default_item_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl SourceConfig {
    /// URL of a single item's detail record
    pub fn item_endpoint(&self, id: crate::types::StoryId) -> String {
        format!("{}/{}.json", self.item_url.trim_end_matches('/'), id)
    }
}

/// Retry behavior for outbound calls
///
/// The delay between attempts is fixed; it does not grow between attempts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds (default: 1000)
    #[serde(default = "default_retry_delay", with = "duration_millis")]
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay: default_retry_delay(),
        }
    }
}

/// Detail fetch configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of detail fetches in flight (None = one per id)
    #[serde(default)]
    pub max_concurrent_fetches: Option<usize>,

    /// Match wire field names case-insensitively (default: true)
    #[serde(default = "default_true")]
    pub case_insensitive_fields: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: None,
            case_insensitive_fields: true,
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Largest `count` accepted by `GET /api/stories/:count` (default: 500)
    #[serde(default = "default_max_count")]
    pub max_count: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            max_count: default_max_count(),
        }
    }
}

impl Config {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `HN_STORIES_CONFIG` (if set) and apply
    /// environment overrides on top.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => {
                tracing::info!(path = %path, "Loading configuration file");
                Self::from_file(path)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `HN_STORIES_*` overrides looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("HN_STORIES_BEST_STORIES_URL") {
            self.source.best_stories_url = url;
        }
        if let Some(url) = lookup("HN_STORIES_ITEM_URL") {
            self.source.item_url = url;
        }
        if let Some(addr) = lookup("HN_STORIES_BIND_ADDRESS") {
            self.server.bind_address = addr.parse().map_err(|_| {
                Error::config(
                    "server.bind_address",
                    format!("'{addr}' is not a socket address"),
                )
            })?;
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(Error::config(
                "retry.max_attempts",
                "max_attempts must be at least 1",
            ));
        }

        if self.source.request_timeout.is_zero() {
            return Err(Error::config(
                "source.request_timeout",
                "request_timeout must be greater than zero",
            ));
        }

        validate_endpoint("source.best_stories_url", &self.source.best_stories_url)?;
        validate_endpoint("source.item_url", &self.source.item_url)?;

        if self.fetch.max_concurrent_fetches == Some(0) {
            return Err(Error::config(
                "fetch.max_concurrent_fetches",
                "max_concurrent_fetches must be at least 1 when set",
            ));
        }

        if self.server.max_count < 0 {
            return Err(Error::config(
                "server.max_count",
                "max_count must not be negative",
            ));
        }

        Ok(())
    }
}

fn validate_endpoint(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::config(key, "endpoint is not configured"));
    }
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::config(key, format!("'{value}' is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(
            key,
            format!("unsupported URL scheme '{other}'"),
        )),
    }
}

fn default_best_stories_url() -> String {
    "https://hacker-news.firebaseio.com/v0/beststories.json".to_string()
}

fn default_item_url() -> String {
    "https://hacker-news.firebaseio.com/v0/item".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_max_count() -> i64 {
    500
}

// Durations are written as integer milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
