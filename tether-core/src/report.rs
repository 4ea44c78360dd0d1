// Report generation from a finished crawl

use crate::crawl::extract_url_path;
use crate::error::CrawlError;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tether_scanner::{CrawlSummary, PageOutcome, PageRecord};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}'", other)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => f.write_str("text"),
            ReportFormat::Json => f.write_str("json"),
        }
    }
}

pub fn render_report(summary: &CrawlSummary, format: ReportFormat) -> Result<String, CrawlError> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(summary)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
    }
}

pub fn write_report(
    summary: &CrawlSummary,
    format: ReportFormat,
    path: &Path,
) -> Result<(), CrawlError> {
    let rendered = render_report(summary, format)?;
    let mut file = File::create(path)?;
    file.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    Ok(())
}

/// Generate a plain-text crawl report
pub fn generate_crawl_report(summary: &CrawlSummary) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Seed: {}\n", summary.seed));
    report.push_str(&format!("  Origin: {}\n", summary.origin));
    report.push_str(&format!("  Rounds: {}\n", summary.rounds));
    report.push_str(&format!("  URLs visited: {}\n", summary.visited.len()));
    report.push_str(&format!("  Pages stored: {}\n", summary.stored_count()));
    report.push_str(&format!(
        "  Duplicate pages: {}\n",
        summary.duplicate_count()
    ));
    report.push_str(&format!(
        "  Non-HTML skipped: {}\n",
        summary.skipped_count()
    ));
    report.push_str(&format!("  Failed fetches: {}\n", summary.failed_count()));
    report.push_str(&format!(
        "  Store failures: {}\n",
        summary.store_failed_count()
    ));
    report.push_str(&format!(
        "  Started: {}\n",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    report.push_str(&format!(
        "  Elapsed: {:.2}s\n",
        summary.elapsed.as_secs_f64()
    ));
    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    for round in 1..=summary.rounds {
        let mut records: Vec<&PageRecord> =
            summary.pages.iter().filter(|p| p.round == round).collect();
        records.sort_by(|a, b| a.url.cmp(&b.url));

        report.push_str(&format!("## Round {}\n", round));
        report.push_str(&format!("  {} pages\n\n", records.len()));
        for record in records {
            report.push_str(&format_record(record));
            report.push('\n');
        }
        report.push('\n');
    }

    report
}

fn format_record(record: &PageRecord) -> String {
    let path = extract_url_path(&record.url);
    match &record.outcome {
        PageOutcome::Stored { .. } if record.links_discovered > 0 => format!(
            "  {:<10} {} (+{} links)",
            "stored", path, record.links_discovered
        ),
        PageOutcome::Stored { .. } => format!("  {:<10} {}", "stored", path),
        PageOutcome::StoreFailed { reason, .. } => {
            format!("  {:<10} {}  {}", "unsaved", path, reason)
        }
        PageOutcome::Duplicate { hash } => {
            let short: String = hash.to_string().chars().take(12).collect();
            format!("  {:<10} {}  sha256:{}", "duplicate", path, short)
        }
        PageOutcome::Skipped { content_type } => format!(
            "  {:<10} {}  {}",
            "skipped",
            path,
            content_type.as_deref().unwrap_or("no content type")
        ),
        PageOutcome::Failed { reason } => format!("  {:<10} {}  {}", "failed", path, reason),
    }
}
