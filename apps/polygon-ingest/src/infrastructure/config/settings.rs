//! Ingest Configuration Settings
//!
//! Configuration types for the ingest service, loaded from environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

/// Polygon cluster selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cluster {
    /// Stocks cluster (`wss://socket.polygon.io/stocks`).
    #[default]
    Stocks,
    /// Forex cluster.
    Forex,
    /// Crypto cluster.
    Crypto,
}

impl Cluster {
    /// Parse a cluster name case-insensitively; unknown names map to stocks.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "forex" => Self::Forex,
            "crypto" => Self::Crypto,
            _ => Self::Stocks,
        }
    }

    /// The cluster path segment in the WebSocket URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stocks => "stocks",
            Self::Forex => "forex",
            Self::Crypto => "crypto",
        }
    }
}

/// Polygon API key, redacted in debug output.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    #[must_use]
    pub const fn new(key: String) -> Self {
        Self(key)
    }

    /// The raw key value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

/// WebSocket reconnection settings.
#[derive(Debug, Clone)]
pub struct WebSocketSettings {
    /// Initial reconnection delay.
    pub reconnect_delay_initial: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier for exponential backoff.
    pub reconnect_delay_multiplier: f64,
    /// Maximum reconnection attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_initial: Duration::from_secs(1),
            reconnect_delay_max: Duration::from_secs(64),
            reconnect_delay_multiplier: 2.0,
            max_reconnect_attempts: 0, // Unlimited
        }
    }
}

/// Ingest pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Capacity of the feed event channel.
    pub event_channel_capacity: usize,
    /// Directory holding the JSONL bucket files.
    pub data_dir: PathBuf,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            event_channel_capacity: 10_000,
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Complete ingest configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Polygon API key.
    pub api_key: ApiKey,
    /// Cluster to connect to.
    pub cluster: Cluster,
    /// Channel subscriptions, comma separated.
    pub subscriptions: String,
    /// Prometheus metrics port (0 = disabled).
    pub metrics_port: u16,
    /// WebSocket reconnection settings.
    pub websocket: WebSocketSettings,
    /// Pipeline settings.
    pub pipeline: PipelineSettings,
}

impl IngestConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("POLYGON_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("POLYGON_API_KEY".to_string()))?;

        if api_key.is_empty() {
            return Err(ConfigError::EmptyValue("POLYGON_API_KEY".to_string()));
        }

        let cluster = std::env::var("POLYGON_CLUSTER")
            .map(|s| Cluster::from_str_case_insensitive(&s))
            .unwrap_or_default();

        let subscriptions = std::env::var("POLYGON_SUBSCRIPTIONS")
            .unwrap_or_else(|_| "AM.*,T.*,Q.*".to_string());

        let metrics_port = parse_env_u16("INGEST_METRICS_PORT", 9090);

        let websocket = WebSocketSettings {
            reconnect_delay_initial: parse_env_duration_millis(
                "INGEST_RECONNECT_DELAY_INITIAL_MS",
                WebSocketSettings::default().reconnect_delay_initial,
            ),
            reconnect_delay_max: parse_env_duration_secs(
                "INGEST_RECONNECT_DELAY_MAX_SECS",
                WebSocketSettings::default().reconnect_delay_max,
            ),
            reconnect_delay_multiplier: parse_env_f64(
                "INGEST_RECONNECT_DELAY_MULTIPLIER",
                WebSocketSettings::default().reconnect_delay_multiplier,
            ),
            max_reconnect_attempts: parse_env_u32(
                "INGEST_MAX_RECONNECT_ATTEMPTS",
                WebSocketSettings::default().max_reconnect_attempts,
            ),
        };

        let pipeline = PipelineSettings {
            event_channel_capacity: parse_env_usize(
                "INGEST_EVENT_CHANNEL_CAPACITY",
                PipelineSettings::default().event_channel_capacity,
            ),
            data_dir: std::env::var("INGEST_DATA_DIR")
                .map_or_else(|_| PipelineSettings::default().data_dir, PathBuf::from),
        };

        Ok(Self {
            api_key: ApiKey::new(api_key),
            cluster,
            subscriptions,
            metrics_port,
            websocket,
            pipeline,
        })
    }

    /// The WebSocket URL for the configured cluster.
    #[must_use]
    pub fn stream_url(&self) -> String {
        format!("wss://socket.polygon.io/{}", self.cluster.as_str())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
