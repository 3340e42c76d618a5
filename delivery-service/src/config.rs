/// Configuration management for delivery-service
///
/// Loads configuration from environment variables with sensible defaults.
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub media: MediaConfig,
    pub delivery: DeliveryConfig,
    pub live: LiveConfig,
    pub cache: CacheConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub env: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MediaConfig {
    /// Root directory the external processing pipeline writes into
    pub root: PathBuf,
    /// On-demand segment duration in seconds
    pub segment_duration_seconds: u32,
    /// Duration assumed for titles the catalog has no override for
    pub default_duration_seconds: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeliveryConfig {
    /// Bandwidth cap in bits/sec; 0 disables throttling
    pub bandwidth_limit_bps: u64,
    /// Chunk size for streamed delivery in bytes
    pub chunk_size_bytes: usize,
    /// Require a token on segment requests
    pub segment_token_required: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LiveConfig {
    /// Live chunk duration in seconds
    pub segment_duration_seconds: u32,
    /// Poll interval while waiting for a not-yet-produced chunk
    pub chunk_poll_interval_ms: u64,
    /// Upper bound on waiting for a not-yet-produced chunk
    pub chunk_timeout_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CacheConfig {
    pub playlist_ttl_seconds: u64,
    pub storyboard_ttl_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            app: AppConfig {
                host: std::env::var("DELIVERY_SERVICE_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("DELIVERY_SERVICE_PORT")
                    .unwrap_or_else(|_| "8085".to_string())
                    .parse()
                    .unwrap_or(8085),
                env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT")
                    .unwrap_or_else(|_| "/var/media".to_string())
                    .into(),
                segment_duration_seconds: env_parse("MEDIA_SEGMENT_DURATION_SECONDS", 10),
                default_duration_seconds: env_parse("MEDIA_DEFAULT_DURATION_SECONDS", 600.0),
            },
            delivery: DeliveryConfig {
                bandwidth_limit_bps: env_parse("DELIVERY_BANDWIDTH_LIMIT_BPS", 0),
                chunk_size_bytes: env_parse("DELIVERY_CHUNK_SIZE_BYTES", 64 * 1024),
                segment_token_required: env_parse("DELIVERY_SEGMENT_TOKEN_REQUIRED", false),
            },
            live: LiveConfig {
                segment_duration_seconds: env_parse("LIVE_SEGMENT_DURATION_SECONDS", 2),
                chunk_poll_interval_ms: env_parse("LIVE_CHUNK_POLL_INTERVAL_MS", 100),
                chunk_timeout_ms: env_parse("LIVE_CHUNK_TIMEOUT_MS", 10_000),
            },
            cache: CacheConfig {
                playlist_ttl_seconds: env_parse("CACHE_PLAYLIST_TTL_SECONDS", 300),
                storyboard_ttl_seconds: env_parse("CACHE_STORYBOARD_TTL_SECONDS", 3600),
            },
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
