//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

use podium_types::WidgetConfig;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Voice SDK settings shared by all widgets.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Widgets rendered on the demo page.
    #[serde(default)]
    pub widgets: Vec<WidgetEntry>,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "podium_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Shared voice SDK configuration.
#[derive(Clone, Default, Deserialize)]
pub struct VoiceConfig {
    /// Vendor SDK public API key, used by every widget that does not carry
    /// its own.
    #[serde(default)]
    pub api_key: String,
}

impl fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceConfig")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// One `[[widgets]]` entry.
///
/// Display strings are optional and fall back to the stock demo copy;
/// `api_key` falls back to `[voice].api_key`.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetEntry {
    pub widget_id: String,
    pub assistant_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_button_text: Option<String>,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Resolves the `[[widgets]]` entries into full widget configurations.
    pub fn widget_configs(&self) -> Vec<WidgetConfig> {
        self.widgets
            .iter()
            .map(|entry| {
                let api_key = entry
                    .api_key
                    .clone()
                    .unwrap_or_else(|| self.voice.api_key.clone());
                let mut config = WidgetConfig::new(
                    entry.widget_id.clone(),
                    api_key,
                    entry.assistant_id.clone(),
                );
                if let Some(title) = &entry.title {
                    config.title = title.clone();
                }
                if let Some(description) = &entry.description {
                    config.description = description.clone();
                }
                if let Some(text) = &entry.start_button_text {
                    config.start_button_text = text.clone();
                }
                config
            })
            .collect()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `PODIUM_HOST` overrides `server.host`
/// - `PODIUM_PORT` overrides `server.port`
/// - `PODIUM_LOG_LEVEL` overrides `logging.level`
/// - `PODIUM_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `PODIUM_API_KEY` overrides `voice.api_key`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("PODIUM_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("PODIUM_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("PODIUM_LOG_LEVEL") {
        if !level.trim().is_empty() {
            config.logging.level = level;
        }
    }
    if let Ok(json) = std::env::var("PODIUM_LOG_JSON") {
        config.logging.json = json == "true";
    }
    if let Ok(api_key) = std::env::var("PODIUM_API_KEY") {
        if !api_key.trim().is_empty() {
            config.voice.api_key = api_key;
        }
    }

    Ok(config)
}
