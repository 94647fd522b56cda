//! Mentord configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main mentord configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// HTTP server configuration
    pub server: ServerConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Prayer-time source configuration
    pub prayer: PrayerConfig,

    /// Chat interpreter configuration
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .mentord.yml
        let local_config = PathBuf::from(".mentord.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/mentord/mentord.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("mentord").join("mentord.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 2000,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn get_api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).context(format!(
            "API key not found. Set the {} environment variable.",
            self.api_key_env
        ))
    }

    /// Whether a usable API key is present. Without one the coach runs in
    /// fallback-only mode instead of failing.
    pub fn is_configured(&self) -> bool {
        std::env::var(&self.api_key_env)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,

    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database
    #[serde(rename = "db-path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        // Use XDG data directory (~/.local/share/mentord on Linux)
        let db_path = dirs::data_dir()
            .map(|d| d.join("mentord").join("mentord.db"))
            .unwrap_or_else(|| PathBuf::from("mentord.db"))
            .to_string_lossy()
            .into_owned();

        Self { db_path }
    }
}

/// Prayer-time source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerConfig {
    /// API base URL (muftyat.kz-compatible year table)
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Fixed location latitude
    pub latitude: String,

    /// Fixed location longitude
    pub longitude: String,

    /// Cache TTL in seconds
    #[serde(rename = "cache-ttl-secs")]
    pub cache_ttl_secs: u64,

    /// Minutes before fajr used for the suhoor cutoff
    #[serde(rename = "suhoor-offset-mins")]
    pub suhoor_offset_mins: u32,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        // Almaty
        Self {
            base_url: "https://api.muftyat.kz".to_string(),
            latitude: "43.238293".to_string(),
            longitude: "76.945465".to_string(),
            cache_ttl_secs: 24 * 60 * 60,
            suhoor_offset_mins: 10,
        }
    }
}

/// Chat interpreter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// How many prior messages are forwarded to the provider
    #[serde(rename = "history-window")]
    pub history_window: usize,

    /// Default page size for the chat-history endpoint
    #[serde(rename = "history-limit")]
    pub history_limit: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_window: 10,
            history_limit: 50,
        }
    }
}
