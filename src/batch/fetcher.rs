use thiserror::Error;

use crate::enrichment::EnrichmentRecord;

/// Why a domain's enrichment record could not be obtained.
///
/// The batch path recovers from every variant by substituting a placeholder
/// row; only single-domain callers see these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("enrichment service returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed enrichment payload: {0}")]
    Payload(String),

    #[error("fetch panicked: {0}")]
    Panicked(String),
}

impl FetchError {
    /// Rejected credential (401/403)
    pub fn is_auth(&self) -> bool {
        matches!(self, FetchError::Status { status: 401 | 403 })
    }

    /// Quota or rate limit exhausted (429)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::Status { status: 429 })
    }

    /// Worth retrying: transport failures and 5xx responses
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::Status { status } => *status >= 500,
            _ => false,
        }
    }
}

/// Source of enrichment records, one domain per call.
///
/// Implementations may do network I/O. The aggregator awaits each call
/// before issuing the next, so implementations need not be reentrant.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, domain: &str) -> Result<EnrichmentRecord, FetchError>;
}
