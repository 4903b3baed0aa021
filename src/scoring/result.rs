use serde::{Serialize, Serializer};
use std::fmt;

use super::group::ScoreGroup;

/// Sentinel shown for fields the provider did not return
pub const NOT_AVAILABLE: &str = "N/A";

/// Headcount as reported. Zero and absence both read as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Employees {
    Count(u64),
    Unknown,
}

impl From<Option<u64>> for Employees {
    fn from(count: Option<u64>) -> Self {
        match count {
            Some(n) if n > 0 => Employees::Count(n),
            _ => Employees::Unknown,
        }
    }
}

impl fmt::Display for Employees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Employees::Count(n) => write!(f, "{}", n),
            Employees::Unknown => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Employees {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Employees::Count(n) => serializer.serialize_u64(*n),
            Employees::Unknown => serializer.serialize_str(NOT_AVAILABLE),
        }
    }
}

/// Scored row for one domain.
///
/// Field order matches [`ScoreResult::HEADERS`] and is relied on by every
/// tabular consumer (TSV, CSV, JSON key order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub organization: String,
    pub domain: String,
    pub industry: String,
    pub emails_found: u64,
    pub employees: Employees,
    pub score: u32,
    pub score_group: ScoreGroup,
}

impl ScoreResult {
    pub const HEADERS: [&'static str; 7] = [
        "organization",
        "domain",
        "industry",
        "emails_found",
        "employees",
        "score",
        "score_group",
    ];

    /// Fixed zero row substituted when a domain could not be fetched
    pub fn placeholder(domain: &str) -> Self {
        Self {
            organization: NOT_AVAILABLE.to_string(),
            domain: domain.to_string(),
            industry: NOT_AVAILABLE.to_string(),
            emails_found: 0,
            employees: Employees::Unknown,
            score: 0,
            score_group: ScoreGroup::classify(0),
        }
    }

    /// Cell values in [`ScoreResult::HEADERS`] order
    pub fn to_row(&self) -> [String; 7] {
        [
            self.organization.clone(),
            self.domain.clone(),
            self.industry.clone(),
            self.emails_found.to_string(),
            self.employees.to_string(),
            self.score.to_string(),
            self.score_group.to_string(),
        ]
    }
}
