//! Configuration model.

use crate::core::poster::ImageSize;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_TMDB_HOSTS: &[&str] = &["https://api.tmdb.org/3", "https://api.themoviedb.org/3"];
const DEFAULT_CACHE_URL: &str = "http://localhost:5000/api";
const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream metadata provider.
    pub tmdb: TmdbConfig,
    /// Local cache/aggregation service.
    pub cache_service: CacheServiceConfig,
    /// Image CDN.
    pub images: ImageConfig,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key, sent as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// Hosts tried in rotation, attempt `i` uses `hosts[i % len]`.
    pub hosts: Vec<String>,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay after the first failed attempt.
    pub first_backoff_ms: u64,
    /// Delay after every later failed attempt.
    pub backoff_ms: u64,
    /// Maximum number of shows enriched for the hero carousel.
    pub hero_limit: usize,
}

/// Cache service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheServiceConfig {
    /// Whether to probe the cache service at all.
    pub enabled: bool,
    /// Base URL, e.g. `http://localhost:5000/api`.
    pub base_url: String,
    /// Probe timeout in milliseconds.
    pub probe_timeout_ms: u64,
    /// How long to skip probes after a failure.
    pub cooldown_secs: u64,
}

/// Image CDN configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// CDN origin, without the `/t/p` suffix.
    pub base_url: String,
    /// Size used when the caller does not pick one.
    pub default_size: ImageSize,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            hosts: DEFAULT_TMDB_HOSTS.iter().map(|h| h.to_string()).collect(),
            timeout_ms: 10_000,
            retries: 2,
            first_backoff_ms: 500,
            backoff_ms: 2_000,
            hero_limit: 15,
        }
    }
}

impl Default for CacheServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_CACHE_URL.to_string(),
            probe_timeout_ms: 500,
            cooldown_secs: 30,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IMAGE_BASE.to_string(),
            default_size: ImageSize::W500,
        }
    }
}

impl Config {
    /// Apply environment variable overrides.
    ///
    /// - `TMDB_API_KEY`: API key
    /// - `SERIEE_CACHE_URL`: cache service base URL
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.trim().is_empty() {
                self.tmdb.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("SERIEE_CACHE_URL") {
            if !url.trim().is_empty() {
                self.cache_service.base_url = url;
            }
        }
        self
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seriee")
}

/// Load configuration from a specific file.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Load configuration from the default location, with env overrides.
///
/// A missing or unreadable file falls back to defaults.
pub fn load_config() -> Config {
    let config_path = config_dir().join("config.toml");

    let config = if config_path.exists() {
        match load_config_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config {}: {}", config_path.display(), e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    config.with_env_overrides()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tmdb.hosts.len(), 2);
        assert_eq!(config.tmdb.retries, 2);
        assert_eq!(config.tmdb.timeout_ms, 10_000);
        assert_eq!(config.cache_service.probe_timeout_ms, 500);
        assert_eq!(config.cache_service.cooldown_secs, 30);
        assert_eq!(config.images.default_size, ImageSize::W500);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tmdb]\nretries = 4\n\n[images]\ndefault_size = \"w342\"").unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.tmdb.retries, 4);
        assert_eq!(config.tmdb.hosts.len(), 2);
        assert_eq!(config.images.default_size, ImageSize::W342);
        assert!(config.cache_service.enabled);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tmdb\nretries = ").unwrap();
        assert!(load_config_from(file.path()).is_err());
    }
}
