pub mod aggregator;
pub mod fetcher;
pub mod pacing;

pub use aggregator::{
    run_batch, run_batch_with_cancel, BatchReport, CancelFlag, GroupSummary, Ranking, DEFAULT_TOP,
};
pub use fetcher::{FetchError, Fetcher};
pub use pacing::{FixedInterval, NoPacing, Pacer};
