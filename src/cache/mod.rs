use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::batch::{FetchError, Fetcher};
use crate::enrichment::EnrichmentRecord;

const CACHE_KEY_PREFIX: &str = "enrichment:";

/// Default lifetime of a cached record
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Get the platform-appropriate cache directory for startup-score
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("startup-score/enrichment"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/startup-score/enrichment",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Remove every cached record
pub fn clear_cache(cache_path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Serializable cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CachedRecord {
    fetched_at: DateTime<Utc>,
    record: EnrichmentRecord,
}

/// Fetcher decorator that keeps successful responses on disk.
///
/// The upstream free tier allows only a few dozen calls a day, so re-running
/// a batch should not spend them again. Failures are never cached, and any
/// cache I/O error falls through to the wrapped fetcher.
pub struct CachingFetcher<F> {
    inner: F,
    cache_path: PathBuf,
    ttl: Duration,
}

impl<F> CachingFetcher<F> {
    pub fn new(inner: F, cache_path: PathBuf, ttl: Duration) -> Self {
        Self {
            inner,
            cache_path,
            ttl,
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    fn lookup(&self, key: &str) -> Option<EnrichmentRecord> {
        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        let entry: CachedRecord = serde_json::from_slice(&bytes).ok()?;
        if is_fresh(entry.fetched_at, Utc::now(), self.ttl) {
            Some(entry.record)
        } else {
            debug!(key = %key, fetched_at = %entry.fetched_at, "Cached record expired");
            None
        }
    }

    fn store(&self, key: &str, record: &EnrichmentRecord) {
        let entry = CachedRecord {
            fetched_at: Utc::now(),
            record: record.clone(),
        };

        // Best effort, a failed write only costs a future API call
        match serde_json::to_vec(&entry) {
            Ok(serialized) => {
                if let Err(e) = cacache::write_sync(&self.cache_path, key, serialized) {
                    debug!(key = %key, error = %e, "Cache write failed");
                }
            }
            Err(e) => debug!(key = %key, error = %e, "Cache serialization failed"),
        }
    }
}

impl<F: Fetcher> Fetcher for CachingFetcher<F> {
    async fn fetch(&self, domain: &str) -> Result<EnrichmentRecord, FetchError> {
        let key = cache_key(domain);

        if let Some(record) = self.lookup(&key) {
            debug!(domain = %domain, "Cache hit");
            return Ok(record);
        }

        let record = self.inner.fetch(domain).await?;
        self.store(&key, &record);
        Ok(record)
    }
}

fn cache_key(domain: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, domain.trim().to_ascii_lowercase())
}

/// Entries stamped in the future (clock skew) count as stale
fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    (now - fetched_at)
        .to_std()
        .map(|age| age < ttl)
        .unwrap_or(false)
}
