mod schema;
mod validation;

pub use schema::Config;
pub use validation::{validate_config, Settings};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Environment variable holding the Hunter.io API key
pub const ENV_API_KEY_VAR: &str = "STARTUP_SCORE_API_KEY";

/// Get the config directory path (~/.config/startup-score/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from(std::env::var("HOME").unwrap_or_default()))
        .join(".config")
        .join("startup-score")
}

/// Get the default config file path (~/.config/startup-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/startup-score/config.yaml)
///
/// The default file is optional: when it does not exist, an empty config is
/// returned. An explicitly given path must exist.
///
/// # Errors
///
/// Returns an error if:
/// - An explicit config path does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    parse_config(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))
}

/// Parse config YAML. A blank document is an empty config.
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_saphyr::from_str(content)?)
}

/// Resolve the API key: STARTUP_SCORE_API_KEY first, then the config file.
/// Returns None if neither is set to a non-empty value.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    pick_api_key(std::env::var(ENV_API_KEY_VAR).ok(), config)
}

fn pick_api_key(env_value: Option<String>, config: &Config) -> Option<String> {
    let non_empty = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    env_value
        .as_deref()
        .and_then(non_empty)
        .or_else(|| config.api_key.as_deref().and_then(non_empty))
}
