//! Configuration management for the personas console.
//!
//! Handles loading and saving configuration from JSONC files.
//! Manages the API endpoint, page size, date formats and logging.

use crate::rows::DateFormats;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the user config dir.
const APP_DIR: &str = "personas-tui";

/// Application configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API (without the collection path)
    pub api_base_url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Rows per grid page
    pub page_size: usize,
    /// chrono format for dates (birth date)
    pub date_format: String,
    /// chrono format for timestamps (registration, last update)
    pub datetime_format: String,
    /// Log file path (relative to config dir or absolute)
    pub log_file: String,
    /// Default log filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
            page_size: 20,
            date_format: DateFormats::DEFAULT_DATE.to_string(),
            datetime_format: DateFormats::DEFAULT_DATETIME.to_string(),
            log_file: "personas-tui.log".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// Searches for config file in:
    /// 1. Provided path (if given)
    /// 2. `$XDG_CONFIG_HOME/personas-tui/config.jsonc`
    ///
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = serde_json::from_str(&strip_line_comments(&content))
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.page_size = config.page_size.max(1);

        Ok(config)
    }

    /// Save configuration to file.
    ///
    /// # Details
    /// Creates config directory if it doesn't exist.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Get default configuration file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - `$XDG_CONFIG_HOME/personas-tui/config.jsonc`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(config_dir.join(APP_DIR).join("config.jsonc"))
    }

    /// Get log file path.
    ///
    /// # Details
    /// If log_file is absolute, returns it as-is.
    /// Otherwise, returns path relative to config directory.
    pub fn log_file_path(&self) -> Result<PathBuf> {
        let log_path = Path::new(&self.log_file);
        if log_path.is_absolute() {
            Ok(log_path.to_path_buf())
        } else {
            let config_dir = config_dir()
                .ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
            Ok(config_dir.join(APP_DIR).join(&self.log_file))
        }
    }

    /// Date formats for the grid, falling back to defaults for invalid patterns.
    pub fn date_formats(&self) -> DateFormats {
        DateFormats::new(&self.date_format, &self.datetime_format)
    }
}

/// Strip `//` comments that are not inside a string literal.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| match comment_start(line) {
            Some(pos) => line[..pos].trim_end(),
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte offset of the first `//` outside a string, honoring `\"` escapes.
fn comment_start(line: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = line.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '/' if !in_string && matches!(chars.peek(), Some((_, '/'))) => return Some(pos),
            _ => {}
        }
    }
    None
}
