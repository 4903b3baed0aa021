use reqwest::Url;
use std::time::Duration;

use super::schema::Config;
use crate::batch::{FixedInterval, DEFAULT_TOP};
use crate::cache::DEFAULT_TTL;
use crate::hunter::DEFAULT_BASE_URL;

/// Config values after defaults are applied and every field is checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub pacing: Duration,
    pub top: usize,
    pub cache_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pacing: FixedInterval::DEFAULT_INTERVAL,
            top: DEFAULT_TOP,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<Settings, Vec<String>> {
    let mut errors = Vec::new();
    let mut settings = Settings::default();

    if let Some(ref key) = config.api_key {
        if key.trim().is_empty() {
            errors.push("api_key: must not be empty (remove the line to unset it)".to_string());
        }
    }

    if let Some(ref base_url) = config.base_url {
        match Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                settings.base_url = base_url.trim_end_matches('/').to_string();
            }
            Ok(url) => errors.push(format!(
                "base_url: unsupported scheme '{}' (expected http or https)",
                url.scheme()
            )),
            Err(e) => errors.push(format!("base_url: invalid URL '{}' - {}", base_url, e)),
        }
    }

    if let Some(ref pacing) = config.pacing {
        match humantime::parse_duration(pacing) {
            Ok(d) => settings.pacing = d,
            Err(e) => errors.push(format!("pacing: invalid duration '{}' - {}", pacing, e)),
        }
    }

    if let Some(top) = config.top {
        if top == 0 {
            errors.push("top: must be at least 1".to_string());
        } else {
            settings.top = top;
        }
    }

    if let Some(ref ttl) = config.cache_ttl {
        match humantime::parse_duration(ttl) {
            Ok(d) => settings.cache_ttl = d,
            Err(e) => errors.push(format!("cache_ttl: invalid duration '{}' - {}", ttl, e)),
        }
    }

    if errors.is_empty() {
        Ok(settings)
    } else {
        Err(errors)
    }
}
