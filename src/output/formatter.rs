use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::batch::GroupSummary;
use crate::scoring::{ScoreBreakdown, ScoreGroup, ScoreResult};

/// Output format for batch results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table for humans (summary, top-N, full ranking)
    #[default]
    Table,
    /// Tab-separated rows with a header line
    Tsv,
    /// Comma-separated rows with a header line
    Csv,
    /// JSON array of result objects
    Json,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Tier label padded to a fixed width, colored when requested
fn format_tier(group: ScoreGroup, width: usize, use_colors: bool) -> String {
    let padded = format!("{:<width$}", group.as_str(), width = width);
    if !use_colors {
        return padded;
    }
    match group {
        ScoreGroup::High => padded.green().bold().to_string(),
        ScoreGroup::Mid => padded.yellow().to_string(),
        ScoreGroup::Low => padded.red().to_string(),
    }
}

/// Format ranked rows as a table with columns: Index, Score, Tier, Domain, Organization
/// No headers; index is 1-based rank
pub fn format_scored_table(rows: &[&ScoreResult], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No domains scored.".to_string();
    }

    let term_width = get_terminal_width();

    let index_width = 3;
    let score_width = 4;
    let tier_width = 4;
    let separator = "  ";
    let domain_width = rows
        .iter()
        .map(|r| r.domain.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .enumerate()
        .map(|(idx, result)| {
            let index_str = format!("{:>width$}.", idx + 1, width = index_width - 1);
            let score_str = format!("{:>width$}", result.score, width = score_width);
            let tier_str = format_tier(result.score_group, tier_width, use_colors);
            let domain_str = format!("{:<width$}", result.domain, width = domain_width);

            let fixed_width = index_width
                + 1
                + score_width
                + tier_width
                + domain_width
                + separator.len() * 3;

            let organization = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate(&result.organization, width - fixed_width)
                }
                // Very narrow terminal, show truncated
                Some(_) => truncate(&result.organization, 20),
                // No terminal (pipe), don't truncate
                None => result.organization.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    tier_str,
                    separator,
                    domain_str.cyan(),
                    separator,
                    organization
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str,
                    score_str,
                    separator,
                    tier_str,
                    separator,
                    domain_str,
                    separator,
                    organization
                )
                .trim_end()
                .to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format rows as tab-separated values for scripting
/// Header line followed by one line per row, in export column order
pub fn format_tsv(rows: &[&ScoreResult]) -> String {
    let mut lines = vec![ScoreResult::HEADERS.join("\t")];
    lines.extend(rows.iter().map(|result| {
        result
            .to_row()
            .iter()
            // Tabs or newlines inside a cell would break the row
            .map(|cell| cell.replace(['\t', '\n', '\r'], " "))
            .collect::<Vec<_>>()
            .join("\t")
    }));
    lines.join("\n")
}

/// Format rows as CSV with a header line
pub fn format_csv(rows: &[&ScoreResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(ScoreResult::HEADERS)
        .context("Failed to write CSV header")?;
    for result in rows {
        writer
            .write_record(result.to_row())
            .with_context(|| format!("Failed to write CSV row for {}", result.domain))?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    let text = String::from_utf8(bytes).context("CSV output is not valid UTF-8")?;
    Ok(text.trim_end().to_string())
}

/// Format rows as a pretty-printed JSON array
pub fn format_json(rows: &[&ScoreResult]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("Failed to serialize results")
}

/// One-line tier summary, e.g. "12 domains: 3 High, 5 Mid, 4 Low (2 failed)"
pub fn format_summary(summary: &GroupSummary, use_colors: bool) -> String {
    let tiers = ScoreGroup::ALL
        .iter()
        .map(|&group| {
            let count = summary.count(group);
            let label = format!("{} {}", count, group);
            if !use_colors {
                return label;
            }
            match group {
                ScoreGroup::High => label.green().to_string(),
                ScoreGroup::Mid => label.yellow().to_string(),
                ScoreGroup::Low => label.red().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let noun = if summary.total() == 1 { "domain" } else { "domains" };
    let mut line = format!("{} {}: {}", summary.total(), noun, tiers);
    if summary.failed > 0 {
        line.push_str(&format!(" ({} failed)", summary.failed));
    }
    line
}

/// Headline for a single-domain run: "<org> scored <n>/100 (<tier>)"
pub fn format_score_line(result: &ScoreResult, use_colors: bool) -> String {
    if use_colors {
        format!(
            "{} scored {}/100 ({})",
            result.organization.bold(),
            result.score.bold(),
            format_tier(result.score_group, 0, true)
        )
    } else {
        format!(
            "{} scored {}/100 ({})",
            result.organization, result.score, result.score_group
        )
    }
}

/// Every result field, one per line, in export column order
pub fn format_result_detail(result: &ScoreResult) -> String {
    ScoreResult::HEADERS
        .iter()
        .zip(result.to_row())
        .map(|(header, value)| format!("  {}: {}", header, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Itemized score breakdown, one line per contributing factor
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    if breakdown.factors.is_empty() {
        return "  No factors contributed.".to_string();
    }

    let label_width = breakdown
        .factors
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = breakdown
        .factors
        .iter()
        .map(|factor| {
            let points = format!("+{:>3}", factor.points);
            let points = if use_colors {
                points.green().to_string()
            } else {
                points
            };
            format!(
                "  {}  {:<width$}  {}",
                points,
                factor.label,
                factor.description,
                width = label_width
            )
        })
        .collect();

    lines.push(format!("  {:>4}  total", breakdown.total));
    lines.join("\n")
}
