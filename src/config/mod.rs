//! Configuration module.
//!
//! Precedence: defaults → config file → environment → CLI flags.

pub mod keybindings;
pub mod loader;

pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    default_store_dir, load_config_file, load_config_with_precedence, merge_config, CliOverrides,
    ConfigError, ConfigFile, ResolvedConfig,
};

/// Resolve the full configuration chain in one call.
///
/// # Errors
///
/// Returns `ConfigError` if a config file exists but cannot be read or
/// parsed, or if the resolved values are unusable.
pub fn resolve(
    config_path: Option<std::path::PathBuf>,
    overrides: CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    let file = load_config_with_precedence(config_path)?;
    let resolved = apply_cli_overrides(apply_env_overrides(merge_config(file)), overrides);
    resolved.validate()?;
    Ok(resolved)
}
