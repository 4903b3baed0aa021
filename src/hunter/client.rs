use anyhow::{Context, Result};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::debug;

use crate::batch::{FetchError, Fetcher};
use crate::enrichment::EnrichmentRecord;

pub const DEFAULT_BASE_URL: &str = "https://api.hunter.io";

const DOMAIN_SEARCH_PATH: &str = "/v2/domain-search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Hunter.io domain-search client. The API key is supplied by the caller.
#[derive(Clone)]
pub struct HunterClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HunterClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("startup-score/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    async fn request(&self, url: Url) -> Result<EnrichmentRecord, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.without_url().to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::Payload(e.without_url().to_string()))?;

        parse_domain_search(body)
    }
}

impl Fetcher for HunterClient {
    async fn fetch(&self, domain: &str) -> Result<EnrichmentRecord, FetchError> {
        let url = domain_search_url(&self.base_url, &self.api_key, domain)?;

        // Retry strategy: exponential backoff with 3 attempts, transient errors only
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        debug!(domain = %domain, "Requesting domain search");
        RetryIf::spawn(
            retry_strategy,
            || self.request(url.clone()),
            |e: &FetchError| e.is_transient(),
        )
        .await
    }
}

/// Build the domain-search URL for `domain`
pub fn domain_search_url(base_url: &str, api_key: &str, domain: &str) -> Result<Url, FetchError> {
    let endpoint = format!("{}{}", base_url.trim_end_matches('/'), DOMAIN_SEARCH_PATH);
    Url::parse_with_params(&endpoint, &[("domain", domain), ("api_key", api_key)])
        .map_err(|e| FetchError::Network(format!("invalid endpoint '{}': {}", endpoint, e)))
}

/// Extract the enrichment record from a domain-search response body.
///
/// The record lives under `data`; anything other than an object there is a
/// payload error. Fields inside `data` are read leniently.
pub fn parse_domain_search(body: Value) -> Result<EnrichmentRecord, FetchError> {
    let Value::Object(mut envelope) = body else {
        return Err(FetchError::Payload("response is not a JSON object".to_string()));
    };

    match envelope.remove("data") {
        Some(data @ Value::Object(_)) => serde_json::from_value(data)
            .map_err(|e| FetchError::Payload(e.to_string())),
        Some(_) => Err(FetchError::Payload("'data' is not an object".to_string())),
        None => Err(FetchError::Payload("missing 'data'".to_string())),
    }
}
