//! Configuration file loading with precedence handling.

use crate::state::SessionSettings;
use crate::store::DEFAULT_PAGE_SIZE;
use crate::view_state::{GlyphMetrics, ViewportConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "HEXPLORE_CONFIG";
/// Environment variable naming the acting user.
pub const USER_ENV: &str = "HEXPLORE_USER";
/// Environment variable naming the local store directory.
pub const STORE_DIR_ENV: &str = "HEXPLORE_STORE_DIR";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
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

    /// A value parsed but cannot be used.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/hexplore/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding session blobs and records.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    /// Bytes per page fetched from the blob store.
    #[serde(default)]
    pub page_size: Option<u64>,

    /// Scroll units per row.
    #[serde(default)]
    pub row_height: Option<u64>,

    /// Extra rows rendered above and below the visible area.
    #[serde(default)]
    pub buffer_rows: Option<u64>,

    /// Delay after the last scroll before pages are fetched.
    #[serde(default)]
    pub scroll_debounce_ms: Option<u64>,

    /// Delay after the last resize before rows are re-laid out.
    #[serde(default)]
    pub resize_debounce_ms: Option<u64>,

    /// Acting user name.
    #[serde(default)]
    pub user: Option<String>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub store_dir: PathBuf,
    pub page_size: u64,
    pub row_height: u64,
    pub buffer_rows: u64,
    pub scroll_debounce_ms: u64,
    pub resize_debounce_ms: u64,
    /// `None` means anonymous: sessions can be viewed but not annotated.
    pub user: Option<String>,
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let viewport = ViewportConfig::default();
        Self {
            store_dir: default_store_dir(),
            page_size: DEFAULT_PAGE_SIZE,
            row_height: viewport.row_height,
            buffer_rows: viewport.buffer_rows,
            scroll_debounce_ms: viewport.scroll_debounce.as_millis() as u64,
            resize_debounce_ms: 100,
            user: None,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Reject values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero page size or row height.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.row_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "row_height",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Session tunables for the terminal front end.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            page_size: self.page_size,
            viewport: ViewportConfig {
                row_height: self.row_height,
                buffer_rows: self.buffer_rows,
                scroll_debounce: Duration::from_millis(self.scroll_debounce_ms),
            },
            metrics: GlyphMetrics::TERMINAL,
            resize_debounce: Duration::from_millis(self.resize_debounce_ms),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/hexplore/hexplore.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("hexplore").join("hexplore.log")
    } else {
        PathBuf::from("hexplore.log")
    }
}

/// Resolve default store directory (`~/.local/share/hexplore/store` on Linux).
pub fn default_store_dir() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("hexplore").join("store"),
        None => PathBuf::from("hexplore-store"),
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
/// Returns `~/.config/hexplore/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hexplore").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `HEXPLORE_CONFIG` environment variable
/// 3. Default path `~/.config/hexplore/config.toml`
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

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
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
        store_dir: config.store_dir.unwrap_or(defaults.store_dir),
        page_size: config.page_size.unwrap_or(defaults.page_size),
        row_height: config.row_height.unwrap_or(defaults.row_height),
        buffer_rows: config.buffer_rows.unwrap_or(defaults.buffer_rows),
        scroll_debounce_ms: config
            .scroll_debounce_ms
            .unwrap_or(defaults.scroll_debounce_ms),
        resize_debounce_ms: config
            .resize_debounce_ms
            .unwrap_or(defaults.resize_debounce_ms),
        user: config.user.or(defaults.user),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `HEXPLORE_USER`: acting user
/// - `HEXPLORE_STORE_DIR`: store directory
///
/// Empty values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(user) = std::env::var(USER_ENV) {
        if !user.trim().is_empty() {
            config.user = Some(user);
        }
    }

    if let Ok(dir) = std::env::var(STORE_DIR_ENV) {
        if !dir.is_empty() {
            config.store_dir = PathBuf::from(dir);
        }
    }

    config
}

/// CLI flags that override configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub user: Option<String>,
    pub store_dir: Option<PathBuf>,
    pub page_size: Option<u64>,
}

/// Apply CLI argument overrides to resolved config.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(user) = overrides.user {
        config.user = Some(user);
    }

    if let Some(dir) = overrides.store_dir {
        config.store_dir = dir;
    }

    if let Some(page_size) = overrides.page_size {
        config.page_size = page_size;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
