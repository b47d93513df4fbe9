//! Configuration management.
//!
//! Settings come from, in order of precedence:
//! 1. Environment variables (`SENDPAD_RPC_URL`, `SENDPAD_WALLET_ENDPOINT`)
//! 2. Config file (`~/.sendpad/config.toml`)
//! 3. Default values (BSC testnet, a local wallet endpoint, BUSD)

mod schema;

pub use schema::{AppConfig, ConfigIssue, IssueLevel, NetworkConfig, TokenConfig, WalletConfig};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".sendpad")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from the default path.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config() -> ConfigResult<AppConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from a specific path, falling back to defaults if it does not exist.
///
/// Environment overrides are applied on top.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default().with_env());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AppConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config.with_env())
}

/// Save configuration to a specific path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file written.
pub async fn save_config_to(config: &AppConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default config to `path` unless one exists (or `force` is set).
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn init_config(path: &Path, force: bool) -> ConfigResult<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    save_config_to(&AppConfig::default(), path).await?;
    info!("created default config at {}", path.display());
    Ok(true)
}
