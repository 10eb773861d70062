//! Configuration management for Lenslate
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::cli::Cli;
use crate::error::{LenslateError, Result};

/// Environment variable consulted for the inference API key
pub const API_KEY_ENV: &str = "LENSLATE_API_KEY";

/// Environment variable overriding the history database path
pub const HISTORY_DB_ENV: &str = "LENSLATE_HISTORY_DB";

/// Main configuration structure for Lenslate
///
/// Holds everything needed to run a translation session: application
/// identity, inference service settings, overlay rendering settings, and
/// history persistence settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Application identity and presentation settings
    #[serde(default)]
    pub app: AppConfig,

    /// Inference service configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Overlay rendering configuration
    #[serde(default)]
    pub overlay: OverlayConfig,

    /// History persistence configuration
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logical application id; scopes history storage paths
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// Width in pixels of history thumbnails
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,
}

fn default_app_id() -> String {
    "lenslate".to_string()
}

fn default_thumbnail_width() -> u32 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            thumbnail_width: default_thumbnail_width(),
        }
    }
}

/// Inference service configuration
///
/// The `api_base` exists mainly so tests can point the client at a mock
/// server; production deployments keep the default Google endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the generative inference service
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Model name used for all three call shapes
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; usually supplied via the `LENSLATE_API_KEY` environment
    /// variable rather than the config file
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds; converts a hung call into a stage
    /// failure instead of waiting forever
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_timeout() -> u64 {
    120
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Overlay rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Path to a TTF/OTF font used for the translation overlay
    ///
    /// When the font cannot be loaded the session degrades to
    /// "no overlay, no thumbnail" instead of failing the translation.
    #[serde(default = "default_font_path")]
    pub font_path: String,
}

fn default_font_path() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
        }
    }
}

/// History persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Override for the history database path
    ///
    /// When unset the database lives in the platform data directory.
    #[serde(default)]
    pub db_path: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file, applying environment and CLI
    /// overrides
    ///
    /// A missing file is not an error; defaults are used instead so the CLI
    /// works out of the box.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    /// * `cli` - Parsed command-line arguments whose overrides take
    ///   precedence over the file
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    pub fn load(path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&contents)
                .map_err(|e| LenslateError::Config(format!("Failed to parse {}: {}", path, e)))?
        } else {
            tracing::debug!("No config file at {}, using defaults", path);
            Config::default()
        };

        if config.inference.api_key.is_none() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.inference.api_key = Some(key);
            }
        }

        if let Some(db_path) = &cli.history_db {
            config.history.db_path = Some(db_path.clone());
        }
        if let Some(font_path) = &cli.font {
            config.overlay.font_path = font_path.clone();
        }

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any field is out of range or malformed.
    pub fn validate(&self) -> Result<()> {
        if self.app.app_id.trim().is_empty() {
            return Err(LenslateError::Config("app.app_id must not be empty".to_string()).into());
        }
        if self.app.thumbnail_width == 0 {
            return Err(
                LenslateError::Config("app.thumbnail_width must be at least 1".to_string()).into(),
            );
        }
        if self.inference.model.trim().is_empty() {
            return Err(
                LenslateError::Config("inference.model must not be empty".to_string()).into(),
            );
        }
        if self.inference.timeout_seconds == 0 {
            return Err(LenslateError::Config(
                "inference.timeout_seconds must be at least 1".to_string(),
            )
            .into());
        }
        Url::parse(&self.inference.api_base).map_err(|e| {
            LenslateError::Config(format!(
                "inference.api_base is not a valid URL ({}): {}",
                self.inference.api_base, e
            ))
        })?;
        Ok(())
    }
}
