// Tests for report generation functionality

use chrono::Utc;
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;
use tether_core::report::{ReportFormat, generate_crawl_report, render_report, write_report};
use tether_scanner::{ContentHash, CrawlSummary, PageOutcome, PageRecord};

fn sample_summary() -> CrawlSummary {
    let home = ContentHash::of("<a href=\"/a\">A</a>");
    let mut seed = PageRecord::new(
        "http://example.com/".to_string(),
        1,
        PageOutcome::Stored {
            path: "pages/example.com_.html".into(),
            hash: home,
        },
    );
    seed.links_discovered = 2;

    let pages = vec![
        seed,
        PageRecord::new(
            "http://example.com/index.html".to_string(),
            2,
            PageOutcome::Duplicate { hash: home },
        ),
        PageRecord::new(
            "http://example.com/a".to_string(),
            2,
            PageOutcome::Skipped {
                content_type: Some("image/png".to_string()),
            },
        ),
        PageRecord::with_error(
            "http://example.com/b".to_string(),
            2,
            "HTTP 404".to_string(),
        ),
    ];

    let now = Utc::now();
    CrawlSummary {
        seed: "http://example.com/".to_string(),
        origin: "example.com".to_string(),
        rounds: 2,
        visited: pages.iter().map(|p| p.url.clone()).collect(),
        pages,
        distinct_hashes: 1,
        started_at: now,
        finished_at: now,
        elapsed: Duration::from_millis(1500),
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Ok(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Ok(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Ok(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Ok(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Ok(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("pdf").is_err());
    assert!(ReportFormat::from_str("").is_err());
}

#[test]
fn test_report_format_display() {
    assert_eq!(ReportFormat::Text.to_string(), "text");
    assert_eq!(ReportFormat::Json.to_string(), "json");
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_summary_counts() {
    let report = generate_crawl_report(&sample_summary());

    assert!(report.contains("# Summary:"));
    assert!(report.contains("Origin: example.com"));
    assert!(report.contains("Rounds: 2"));
    assert!(report.contains("URLs visited: 4"));
    assert!(report.contains("Pages stored: 1"));
    assert!(report.contains("Duplicate pages: 1"));
    assert!(report.contains("Non-HTML skipped: 1"));
    assert!(report.contains("Failed fetches: 1"));
    assert!(report.contains("Elapsed: 1.50s"));
}

#[test]
fn test_text_report_rounds_in_order() {
    let report = generate_crawl_report(&sample_summary());

    let first = report.find("## Round 1").unwrap();
    let second = report.find("## Round 2").unwrap();
    assert!(first < second);
    assert!(report.contains("stored     / (+2 links)"));
    assert!(report.contains("failed     /b  HTTP 404"));
    assert!(report.contains("skipped    /a  image/png"));
}

#[test]
fn test_text_report_sorts_round_by_url() {
    let report = generate_crawl_report(&sample_summary());

    let a = report.find("skipped    /a").unwrap();
    let b = report.find("failed     /b").unwrap();
    let index = report.find("duplicate  /index.html").unwrap();
    assert!(a < b);
    assert!(b < index);
}

#[test]
fn test_text_report_empty_crawl() {
    let mut summary = sample_summary();
    summary.pages.clear();
    summary.visited.clear();
    summary.rounds = 0;

    let report = generate_crawl_report(&summary);
    assert!(report.contains("URLs visited: 0"));
    assert!(!report.contains("## Round"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let rendered = render_report(&sample_summary(), ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["rounds"], 2);
    assert_eq!(value["origin"], "example.com");
    assert_eq!(value["pages"].as_array().unwrap().len(), 4);
    assert_eq!(value["pages"][0]["outcome"]["status"], "stored");
    assert_eq!(value["pages"][1]["outcome"]["status"], "duplicate");
    assert_eq!(
        value["pages"][1]["outcome"]["hash"],
        value["pages"][0]["outcome"]["hash"]
    );
    assert_eq!(value["pages"][3]["outcome"]["reason"], "HTTP 404");
}

#[test]
fn test_write_report_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    write_report(&sample_summary(), ReportFormat::Text, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("# Summary:"));
    assert!(written.ends_with('\n'));
}
