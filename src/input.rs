//! Domain list ingest.
//!
//! Reads the ordered list of domains to score from a CSV file with a
//! `domain` column. Order and duplicates are preserved; blank cells are
//! skipped. Rows that cannot be decoded are skipped and their line numbers
//! reported back.

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Name of the required column (matched case-insensitively)
pub const DOMAIN_COLUMN: &str = "domain";

/// Domains read from a CSV file, plus the lines that could not be read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainList {
    pub domains: Vec<String>,
    /// 1-based line numbers of unreadable rows
    pub skipped_lines: Vec<usize>,
}

/// Load domains from a CSV file
pub fn load_domains(path: &Path) -> Result<DomainList> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open domain list '{}'", path.display()))?;
    parse_domains(file).with_context(|| format!("Invalid domain list '{}'", path.display()))
}

/// Parse domains from CSV content
pub fn parse_domains<R: Read>(reader: R) -> Result<DomainList> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().context("Failed to read CSV headers")?.clone();
    let Some(column) = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').eq_ignore_ascii_case(DOMAIN_COLUMN))
    else {
        bail!("CSV must have a '{}' column", DOMAIN_COLUMN);
    };

    let mut list = DomainList::default();
    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "Skipping unreadable CSV row");
                list.skipped_lines.push(line);
                continue;
            }
        };

        match record.get(column) {
            Some(domain) if !domain.is_empty() => list.domains.push(domain.to_string()),
            _ => continue,
        }
    }

    Ok(list)
}
