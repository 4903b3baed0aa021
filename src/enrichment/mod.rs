pub mod coerce;
pub mod types;

pub use types::{EmailEntry, EmailKind, EnrichmentRecord};
