use super::group::ScoreGroup;
use super::result::{Employees, ScoreResult, NOT_AVAILABLE};
use crate::enrichment::{EmailEntry, EmailKind, EnrichmentRecord};

const POINTS_PER_EMAIL: u64 = 10;
const EMAIL_VOLUME_CAP: u64 = 30;
const INDUSTRY_POINTS: u32 = 10;
const HEADCOUNT_POINTS: u32 = 20;
const HEADCOUNT_MIN: u64 = 10; // strictly greater than this
const WEBMAIL_POINTS: u32 = 10;
const CONFIDENCE_POINTS: u32 = 10;
const CONFIDENCE_MIN: f64 = 80.0;
const POSITION_POINTS: u32 = 5;

const TARGET_INDUSTRIES: [&str; 3] = ["software", "technology", "saas"];
const KEY_POSITIONS: [&str; 3] = ["ceo", "founder", "cto"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Email volume", "Industry"
    pub description: String, // e.g. "2 emails found (capped at 30)"
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub total: u32,
    pub factors: Vec<FactorContribution>,
}

/// Score one enrichment record.
///
/// Pure and total: every absent field contributes zero. The per-email bonus
/// has no upper bound, so totals above 100 are possible.
pub fn score(record: &EnrichmentRecord) -> ScoreResult {
    let total = explain(record).total;

    ScoreResult {
        organization: record.display_name().to_string(),
        domain: record.domain.clone(),
        industry: record
            .industry
            .clone()
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        emails_found: record.emails_count.unwrap_or(0),
        employees: Employees::from(record.employees_count),
        score: total,
        score_group: ScoreGroup::classify(total),
    }
}

/// Itemized score: one contribution per term that added points.
pub fn explain(record: &EnrichmentRecord) -> ScoreBreakdown {
    let mut factors = Vec::new();

    // Email volume (capped)
    if let Some(count) = record.emails_count.filter(|&n| n > 0) {
        let points = count.saturating_mul(POINTS_PER_EMAIL).min(EMAIL_VOLUME_CAP) as u32;
        factors.push(FactorContribution {
            label: "Email volume".to_string(),
            description: format!("{} emails found (capped at {})", count, EMAIL_VOLUME_CAP),
            points,
        });
    }

    if let Some(ref industry) = record.industry {
        if is_target_industry(industry) {
            factors.push(FactorContribution {
                label: "Industry".to_string(),
                description: format!("'{}' is a target industry", industry),
                points: INDUSTRY_POINTS,
            });
        }
    }

    if let Some(employees) = record.employees_count.filter(|&n| n > HEADCOUNT_MIN) {
        factors.push(FactorContribution {
            label: "Headcount".to_string(),
            description: format!("{} employees (> {})", employees, HEADCOUNT_MIN),
            points: HEADCOUNT_POINTS,
        });
    }

    if record.webmail == Some(true) {
        factors.push(FactorContribution {
            label: "Webmail".to_string(),
            description: "domain uses a webmail provider".to_string(),
            points: WEBMAIL_POINTS,
        });
    }

    // Per-email bonuses: uncapped, both sub-bonuses may apply to one entry
    for (i, email) in record.emails.iter().enumerate() {
        if !is_contact_email(email) {
            continue;
        }

        if email.confidence.is_some_and(|c| c >= CONFIDENCE_MIN) {
            factors.push(FactorContribution {
                label: format!("Email #{} confidence", i + 1),
                description: format!(
                    "{} email at {}% confidence",
                    email.kind.as_str(),
                    email.confidence.unwrap_or_default()
                ),
                points: CONFIDENCE_POINTS,
            });
        }

        if let Some(ref position) = email.position {
            if is_key_position(position) {
                factors.push(FactorContribution {
                    label: format!("Email #{} position", i + 1),
                    description: format!("{} email belongs to {}", email.kind.as_str(), position),
                    points: POSITION_POINTS,
                });
            }
        }
    }

    let total = factors
        .iter()
        .fold(0u32, |acc, f| acc.saturating_add(f.points));

    ScoreBreakdown { total, factors }
}

fn is_target_industry(industry: &str) -> bool {
    TARGET_INDUSTRIES
        .iter()
        .any(|t| industry.eq_ignore_ascii_case(t))
}

fn is_key_position(position: &str) -> bool {
    KEY_POSITIONS.iter().any(|p| position.eq_ignore_ascii_case(p))
}

fn is_contact_email(email: &EmailEntry) -> bool {
    matches!(email.kind, EmailKind::Generic | EmailKind::Personal)
}
