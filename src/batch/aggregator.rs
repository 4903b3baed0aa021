use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::fetcher::{FetchError, Fetcher};
use super::pacing::Pacer;
use crate::scoring::{score, ScoreGroup, ScoreResult};

/// Set to stop a running batch before its next fetch.
pub type CancelFlag = Arc<AtomicBool>;

/// Default size of the leaderboard view
pub const DEFAULT_TOP: usize = 10;

/// Fetch, score and collect every domain in order.
///
/// Never fails: a domain whose fetch errors (or panics) gets a placeholder
/// row and the loop moves on. `pacer` runs between successive fetches,
/// whatever the outcome of the previous one.
pub async fn run_batch<F, P>(domains: &[String], fetcher: &F, pacer: &P) -> BatchReport
where
    F: Fetcher,
    P: Pacer,
{
    run_batch_with_cancel(domains, fetcher, pacer, &CancelFlag::default()).await
}

/// [`run_batch`] with a cooperative cancellation check before each fetch.
pub async fn run_batch_with_cancel<F, P>(
    domains: &[String],
    fetcher: &F,
    pacer: &P,
    cancel: &CancelFlag,
) -> BatchReport
where
    F: Fetcher,
    P: Pacer,
{
    info!(domains = domains.len(), "Starting batch");

    let mut results = Vec::with_capacity(domains.len());
    let mut failed = Vec::new();
    let mut cancelled = false;

    for (i, domain) in domains.iter().enumerate() {
        if i > 0 {
            pacer.pause().await;
        }

        // Checked after the pause so an interrupt during it sends no further request
        if cancel.load(Ordering::Relaxed) {
            warn!(processed = i, remaining = domains.len() - i, "Batch cancelled");
            cancelled = true;
            break;
        }

        let outcome = AssertUnwindSafe(fetch_and_score(fetcher, domain))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(FetchError::Panicked(panic_message(payload))));

        match outcome {
            Ok(result) => {
                debug!(domain = %domain, score = result.score, group = %result.score_group, "Scored");
                results.push(result);
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "Fetch failed, using placeholder");
                failed.push(domain.clone());
                results.push(ScoreResult::placeholder(domain));
            }
        }
    }

    info!(
        scored = results.len() - failed.len(),
        failed = failed.len(),
        "Batch finished"
    );

    BatchReport {
        results,
        failed,
        cancelled,
    }
}

async fn fetch_and_score<F: Fetcher>(fetcher: &F, domain: &str) -> Result<ScoreResult, FetchError> {
    let mut record = fetcher.fetch(domain).await?;
    if record.domain.is_empty() {
        record.domain = domain.to_string();
    }
    Ok(score(&record))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Results of a batch run, in fetch order, plus derived views.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    results: Vec<ScoreResult>,
    failed: Vec<String>,
    cancelled: bool,
}

impl BatchReport {
    /// Wrap already-scored rows (no failures, not cancelled)
    pub fn from_results(results: Vec<ScoreResult>) -> Self {
        Self {
            results,
            failed: Vec::new(),
            cancelled: false,
        }
    }

    /// Rows in the order the domains were fetched
    pub fn results(&self) -> &[ScoreResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<ScoreResult> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Domains that got a placeholder row
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// True if the batch stopped before reaching every domain
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// All rows by score descending. Ties keep fetch order.
    pub fn ranking(&self) -> Ranking<'_> {
        let mut rows: Vec<&ScoreResult> = self.results.iter().collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Ranking { rows }
    }

    /// Ranked rows split per tier, best tier first. Empty tiers are kept.
    pub fn by_group(&self) -> Vec<(ScoreGroup, Vec<&ScoreResult>)> {
        let ranking = self.ranking();
        ScoreGroup::ALL
            .iter()
            .map(|&group| {
                let rows = ranking
                    .all()
                    .iter()
                    .copied()
                    .filter(|r| r.score_group == group)
                    .collect();
                (group, rows)
            })
            .collect()
    }

    pub fn summary(&self) -> GroupSummary {
        let mut summary = GroupSummary {
            failed: self.failed.len(),
            ..GroupSummary::default()
        };
        for result in &self.results {
            match result.score_group {
                ScoreGroup::High => summary.high += 1,
                ScoreGroup::Mid => summary.mid += 1,
                ScoreGroup::Low => summary.low += 1,
            }
        }
        summary
    }
}

/// Rows sorted by score. Every top-N view is a prefix of the same order.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    rows: Vec<&'a ScoreResult>,
}

impl<'a> Ranking<'a> {
    pub fn all(&self) -> &[&'a ScoreResult] {
        &self.rows
    }

    /// First `n` rows, or fewer if the batch is smaller
    pub fn top(&self, n: usize) -> &[&'a ScoreResult] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Row counts per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupSummary {
    pub high: usize,
    pub mid: usize,
    pub low: usize,
    pub failed: usize, // placeholder rows, also counted in `low`
}

impl GroupSummary {
    pub fn count(&self, group: ScoreGroup) -> usize {
        match group {
            ScoreGroup::High => self.high,
            ScoreGroup::Mid => self.mid,
            ScoreGroup::Low => self.low,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.mid + self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::pacing::NoPacing;
    use crate::enrichment::{EmailEntry, EmailKind, EnrichmentRecord};
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    /// Deterministic fetcher backed by a map; unknown domains fail with 404.
    struct MockFetcher {
        records: HashMap<String, EnrichmentRecord>,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn new(records: Vec<EnrichmentRecord>) -> Self {
            Self {
                records: records.into_iter().map(|r| (r.domain.clone(), r)).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, domain: &str) -> Result<EnrichmentRecord, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if domain == "panic.io" {
                panic!("upstream exploded");
            }
            self.records
                .get(domain)
                .cloned()
                .ok_or(FetchError::Status { status: 404 })
        }
    }

    #[derive(Default)]
    struct CountingPacer {
        pauses: AtomicUsize,
    }

    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.pauses.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Record scoring exactly `points` (a multiple of 10) from confident emails
    fn record_scoring(domain: &str, points: u32) -> EnrichmentRecord {
        let mut record = EnrichmentRecord::for_domain(domain);
        record.emails = (0..points / 10)
            .map(|_| EmailEntry::new(EmailKind::Generic, Some(90.0), None))
            .collect();
        record
    }

    fn domains(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_going() {
        let fetcher = MockFetcher::new(vec![record_scoring("a.io", 20), record_scoring("c.io", 50)]);
        let report = run_batch(&domains(&["a.io", "missing.io", "c.io"]), &fetcher, &NoPacing).await;

        let results = report.results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].domain, "a.io");
        assert_eq!(results[0].score, 20);
        assert_eq!(results[1], ScoreResult::placeholder("missing.io"));
        assert_eq!(results[1].score_group, ScoreGroup::Low);
        assert_eq!(results[2].domain, "c.io");
        assert_eq!(results[2].score, 50);
        assert_eq!(results[2].score_group, ScoreGroup::Mid);
        assert_eq!(report.failed(), ["missing.io".to_string()]);
        assert!(!report.cancelled());
    }

    #[tokio::test]
    async fn test_panicking_fetch_becomes_placeholder() {
        let fetcher = MockFetcher::new(vec![record_scoring("a.io", 10)]);
        let report = run_batch(&domains(&["panic.io", "a.io"]), &fetcher, &NoPacing).await;

        assert_eq!(report.len(), 2);
        assert_eq!(report.results()[0], ScoreResult::placeholder("panic.io"));
        assert_eq!(report.results()[1].score, 10);
    }

    #[tokio::test]
    async fn test_batch_is_idempotent() {
        let fetcher = MockFetcher::new(vec![
            record_scoring("a.io", 30),
            record_scoring("b.io", 80),
        ]);
        let list = domains(&["a.io", "b.io", "nope.io"]);

        let first = run_batch(&list, &fetcher, &NoPacing).await;
        let second = run_batch(&list, &fetcher, &NoPacing).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ranking_sorted_and_top_is_prefix() {
        let fetcher = MockFetcher::new(vec![
            record_scoring("a", 10),
            record_scoring("b", 90),
            record_scoring("c", 50),
        ]);
        let report = run_batch(&domains(&["a", "b", "c"]), &fetcher, &NoPacing).await;

        let ranking = report.ranking();
        let order: Vec<(&str, u32)> = ranking.all().iter().map(|r| (r.domain.as_str(), r.score)).collect();
        assert_eq!(order, vec![("b", 90), ("c", 50), ("a", 10)]);

        assert_eq!(ranking.top(2), &ranking.all()[..2]);
        assert_eq!(ranking.top(DEFAULT_TOP), ranking.all());
        assert!(ranking.top(0).is_empty());
    }

    #[tokio::test]
    async fn test_ranking_is_stable_on_ties() {
        let fetcher = MockFetcher::new(vec![
            record_scoring("first", 40),
            record_scoring("second", 60),
            record_scoring("third", 40),
        ]);
        let report = run_batch(
            &domains(&["first", "second", "third", "gone-1", "gone-2"]),
            &fetcher,
            &NoPacing,
        )
        .await;

        let order: Vec<&str> = report.ranking().all().iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(order, vec!["second", "first", "third", "gone-1", "gone-2"]);
    }

    #[tokio::test]
    async fn test_pacer_runs_between_fetches_even_after_failure() {
        let fetcher = MockFetcher::new(vec![record_scoring("a.io", 10)]);
        let pacer = CountingPacer::default();
        run_batch(&domains(&["bad.io", "a.io", "worse.io"]), &fetcher, &pacer).await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let fetcher = MockFetcher::new(vec![]);
        let pacer = CountingPacer::default();
        let report = run_batch(&[], &fetcher, &pacer).await;

        assert!(report.is_empty());
        assert!(report.ranking().top(DEFAULT_TOP).is_empty());
        assert_eq!(pacer.pauses.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_record_domain_uses_requested_domain() {
        struct Anonymous;
        impl Fetcher for Anonymous {
            async fn fetch(&self, _domain: &str) -> Result<EnrichmentRecord, FetchError> {
                Ok(EnrichmentRecord::default())
            }
        }

        let report = run_batch(&domains(&["acme.io"]), &Anonymous, &NoPacing).await;
        assert_eq!(report.results()[0].domain, "acme.io");
        assert_eq!(report.results()[0].organization, "acme.io");
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_fetch() {
        struct CancelAfterFirst {
            cancel: CancelFlag,
        }
        impl Fetcher for CancelAfterFirst {
            async fn fetch(&self, domain: &str) -> Result<EnrichmentRecord, FetchError> {
                self.cancel.store(true, Ordering::Relaxed);
                Ok(EnrichmentRecord::for_domain(domain))
            }
        }

        let cancel = CancelFlag::default();
        let fetcher = CancelAfterFirst {
            cancel: cancel.clone(),
        };
        let report =
            run_batch_with_cancel(&domains(&["a", "b", "c"]), &fetcher, &NoPacing, &cancel).await;

        assert!(report.cancelled());
        assert_eq!(report.len(), 1);
        assert_eq!(report.results()[0].domain, "a");
    }

    #[tokio::test]
    async fn test_cancel_during_pause_skips_next_fetch() {
        struct CancellingPacer {
            cancel: CancelFlag,
        }
        impl Pacer for CancellingPacer {
            async fn pause(&self) {
                self.cancel.store(true, Ordering::Relaxed);
            }
        }

        let fetcher = MockFetcher::new(vec![
            record_scoring("a.io", 10),
            record_scoring("b.io", 20),
            record_scoring("c.io", 30),
        ]);
        let cancel = CancelFlag::default();
        let pacer = CancellingPacer {
            cancel: cancel.clone(),
        };
        let report =
            run_batch_with_cancel(&domains(&["a.io", "b.io", "c.io"]), &fetcher, &pacer, &cancel)
                .await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(report.cancelled());
        assert_eq!(report.len(), 1);
        assert_eq!(report.results()[0].domain, "a.io");
    }

    #[tokio::test]
    async fn test_by_group_and_summary() {
        let fetcher = MockFetcher::new(vec![
            record_scoring("hi", 80),
            record_scoring("mid", 40),
            record_scoring("low", 30),
        ]);
        let report = run_batch(&domains(&["low", "mid", "hi", "dead"]), &fetcher, &NoPacing).await;

        let groups = report.by_group();
        let names: Vec<(ScoreGroup, Vec<&str>)> = groups
            .iter()
            .map(|(g, rows)| (*g, rows.iter().map(|r| r.domain.as_str()).collect()))
            .collect();
        assert_eq!(
            names,
            vec![
                (ScoreGroup::High, vec!["hi"]),
                (ScoreGroup::Mid, vec!["mid"]),
                (ScoreGroup::Low, vec!["low", "dead"]),
            ]
        );

        let summary = report.summary();
        assert_eq!(summary, GroupSummary { high: 1, mid: 1, low: 2, failed: 1 });
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.count(ScoreGroup::Low), 2);
    }
}
