//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TSVIZ_CONFIG";

/// Environment variable overriding the grammar id.
pub const LANGUAGE_ENV_VAR: &str = "TSVIZ_LANGUAGE";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A resolved setting is outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Setting name as it appears in the config file.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/tsviz/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Grammar id selected at startup.
    #[serde(default)]
    pub language: Option<String>,

    /// Start in terse serialization mode.
    #[serde(default)]
    pub terse: Option<bool>,

    /// Page URL share links are built on.
    #[serde(default)]
    pub share_base_url: Option<String>,

    /// Quiet window before a recompute, in milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,

    /// Diagram viewport width.
    #[serde(default)]
    pub viewport_width: Option<f64>,

    /// Diagram viewport height.
    #[serde(default)]
    pub viewport_height: Option<f64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Grammar id.
    pub language: String,
    /// Terse serialization mode.
    pub terse: bool,
    /// Share link base URL.
    pub share_base_url: String,
    /// Debounce window in milliseconds.
    pub debounce_ms: u64,
    /// Viewport width.
    pub viewport_width: f64,
    /// Viewport height.
    pub viewport_height: f64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            language: "inference".to_string(),
            terse: false,
            share_base_url: "http://localhost:3000/".to_string(),
            debounce_ms: 500,
            viewport_width: 800.0,
            viewport_height: 600.0,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Debounce window as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check value ranges that TOML types cannot express.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidValue` for an empty language or a viewport
    /// dimension that is not a positive finite number.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.language.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "language",
                reason: "must not be empty".to_string(),
            });
        }
        for (field, value) in [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }
        Ok(())
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/tsviz/tsviz.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("tsviz").join("tsviz.log"),
        None => PathBuf::from("tsviz.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/tsviz/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tsviz").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `TSVIZ_CONFIG` environment variable
/// 3. Default path `~/.config/tsviz/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks `TSVIZ_LANGUAGE`; an empty value is ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(language) = std::env::var(LANGUAGE_ENV_VAR) {
        if !language.is_empty() {
            config.language = language;
        }
    }
    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        language: config.language.unwrap_or(defaults.language),
        terse: config.terse.unwrap_or(defaults.terse),
        share_base_url: config.share_base_url.unwrap_or(defaults.share_base_url),
        debounce_ms: config.debounce_ms.unwrap_or(defaults.debounce_ms),
        viewport_width: config.viewport_width.unwrap_or(defaults.viewport_width),
        viewport_height: config.viewport_height.unwrap_or(defaults.viewport_height),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Settings given explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// `--language`
    pub language: Option<String>,
    /// `--terse`
    pub terse: Option<bool>,
    /// `--width`
    pub viewport_width: Option<f64>,
    /// `--height`
    pub viewport_height: Option<f64>,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only flags that were explicitly set are applied.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(language) = cli.language {
        config.language = language;
    }
    if let Some(terse) = cli.terse {
        config.terse = terse;
    }
    if let Some(width) = cli.viewport_width {
        config.viewport_width = width;
    }
    if let Some(height) = cli.viewport_height {
        config.viewport_height = height;
    }
    config
}

/// Run the full chain: defaults → file → env → CLI, then validate.
///
/// # Errors
///
/// Config file read/parse errors, or `InvalidValue` from validation.
pub fn resolve(
    config_path: Option<PathBuf>,
    cli: CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let config = apply_cli_overrides(apply_env_overrides(merge_config(file)), cli);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
