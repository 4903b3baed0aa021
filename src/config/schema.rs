use serde::{Deserialize, Serialize};

/// Configuration file contents.
///
/// Every field is optional; unset fields fall back to built-in defaults
/// when the config is validated.
///
/// Example YAML:
/// ```yaml
/// api_key: "your-hunter-key"
/// pacing: "1100ms"
/// top: 10
/// cache_ttl: "24h"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Hunter.io API key (overridden by STARTUP_SCORE_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enrichment service base URL (default: https://api.hunter.io)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Delay between successive fetches, humantime format (default: "1100ms")
    #[serde(default)]
    pub pacing: Option<String>,

    /// Rows shown in the top-N table (default: 10)
    #[serde(default)]
    pub top: Option<usize>,

    /// How long cached records stay valid, humantime format (default: "24h")
    #[serde(default)]
    pub cache_ttl: Option<String>,
}
