use std::io::Cursor;
use tempfile::TempDir;
use tether::commands::command_argument_builder;
use tether::handlers::*;
use tracing::Level;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prompt(input: &str) -> (anyhow::Result<url::Url>, String) {
    let mut reader = Cursor::new(input.as_bytes().to_vec());
    let mut out = Vec::new();
    let result = prompt_for_url(&mut reader, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_parse_seed_url_accepts_http_and_https() {
    assert_eq!(
        parse_seed_url("https://example.com").map(|u| u.to_string()),
        Some("https://example.com/".to_string())
    );
    assert!(parse_seed_url("http://127.0.0.1:8080/docs").is_some());
}

#[test]
fn test_parse_seed_url_trims_and_drops_fragment() {
    let url = parse_seed_url("  http://example.com/page#top \n").unwrap();
    assert_eq!(url.as_str(), "http://example.com/page");
}

#[test]
fn test_parse_seed_url_rejects_invalid() {
    assert!(parse_seed_url("not a valid url!!!").is_none());
    assert!(parse_seed_url("example.com").is_none());
    assert!(parse_seed_url("ftp://example.com/").is_none());
    assert!(parse_seed_url("mailto:someone@example.com").is_none());
    assert!(parse_seed_url("").is_none());
}

#[test]
fn test_prompt_accepts_first_valid_line() {
    let (result, out) = prompt("http://example.com/\n");
    assert_eq!(result.unwrap().as_str(), "http://example.com/");
    assert_eq!(out, PROMPT);
}

#[test]
fn test_prompt_repeats_until_valid() {
    let (result, out) = prompt("nope\n\nhttps://example.com/a\n");
    assert_eq!(result.unwrap().as_str(), "https://example.com/a");
    assert_eq!(out.matches(INVALID_URL_MESSAGE).count(), 2);
    assert_eq!(out.matches(PROMPT).count(), 3);
}

#[test]
fn test_prompt_fails_on_end_of_input() {
    let (result, out) = prompt("still not a url\n");
    assert!(result.is_err());
    assert_eq!(out.matches(INVALID_URL_MESSAGE).count(), 1);
}

#[test]
fn test_resolve_seed_prefers_valid_argument() {
    let mut reader = Cursor::new(Vec::new());
    let mut out = Vec::new();
    let url = resolve_seed_from(Some("http://example.com/"), &mut reader, &mut out).unwrap();
    assert_eq!(url.as_str(), "http://example.com/");
    assert!(out.is_empty());
}

#[test]
fn test_resolve_seed_prompts_after_invalid_argument() {
    let mut reader = Cursor::new(b"http://example.com/x\n".to_vec());
    let mut out = Vec::new();
    let url = resolve_seed_from(Some("bogus"), &mut reader, &mut out).unwrap();
    assert_eq!(url.as_str(), "http://example.com/x");
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with(INVALID_URL_MESSAGE));
}

#[test]
fn test_resolve_seed_prompts_without_argument() {
    let mut reader = Cursor::new(b"http://example.com/\n".to_vec());
    let mut out = Vec::new();
    assert!(resolve_seed_from(None, &mut reader, &mut out).is_ok());
    assert_eq!(String::from_utf8(out).unwrap(), PROMPT);
}

#[test]
fn test_log_level() {
    assert_eq!(log_level(false, false), Level::INFO);
    assert_eq!(log_level(true, false), Level::WARN);
    assert_eq!(log_level(false, true), Level::DEBUG);
}

#[test]
fn test_expand_directory_plain() {
    let dir = expand_directory("downloaded_pages");
    assert_eq!(dir, std::path::PathBuf::from("downloaded_pages"));
}

#[test]
fn test_expand_directory_tilde() {
    if std::env::var_os("HOME").is_none() {
        return;
    }
    let dir = expand_directory("~/pages");
    assert!(!dir.to_string_lossy().starts_with('~'));
    assert!(dir.ends_with("pages"));
}

#[test]
fn test_crawl_options_defaults_from_cli() {
    let matches = command_argument_builder()
        .try_get_matches_from(["tether", "http://example.com/"])
        .unwrap();
    let seed = parse_seed_url("http://example.com/").unwrap();
    let options = crawl_options_from(&matches, &seed);

    assert_eq!(options.url, "http://example.com/");
    assert_eq!(options.directory, std::path::PathBuf::from("downloaded_pages"));
    assert_eq!(options.threads, 10);
    assert_eq!(options.timeout_secs, 10);
    assert_eq!(options.retries, 0);
    assert_eq!(options.max_pages, None);
    assert!(!options.archive_duplicates);
    assert!(options.show_progress_bars);
}

#[test]
fn test_crawl_options_from_flags() {
    let matches = command_argument_builder()
        .try_get_matches_from([
            "tether",
            "http://example.com/",
            "-d",
            "out",
            "-t",
            "4",
            "--timeout",
            "3",
            "--retries",
            "2",
            "--max-pages",
            "50",
            "--archive-duplicates",
            "-q",
        ])
        .unwrap();
    let seed = parse_seed_url("http://example.com/").unwrap();
    let options = crawl_options_from(&matches, &seed);

    assert_eq!(options.directory, std::path::PathBuf::from("out"));
    assert_eq!(options.threads, 4);
    assert_eq!(options.timeout_secs, 3);
    assert_eq!(options.retries, 2);
    assert_eq!(options.max_pages, Some(50));
    assert!(options.archive_duplicates);
    assert!(!options.show_progress_bars);
}

#[test]
fn test_cli_rejects_zero_threads() {
    let result = command_argument_builder().try_get_matches_from(["tether", "-t", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_unknown_format() {
    let result = command_argument_builder().try_get_matches_from(["tether", "-f", "csv"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_quiet_conflicts_with_verbose() {
    let result = command_argument_builder().try_get_matches_from(["tether", "-q", "-v"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_handle_crawl_writes_pages_and_report() {
    let server = MockServer::start().await;
    for (route, body) in [
        ("/", r#"<a href="/a">A</a> <a href="/b">B</a>"#),
        ("/a", r#"<a href="/b">B</a><a href="/c">C</a>"#),
        ("/b", "<p>b</p>"),
        ("/c", "<p>c</p>"),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html"))
            .expect(1)
            .mount(&server)
            .await;
    }

    let dir = TempDir::new().unwrap();
    let pages = dir.path().join("pages");
    let report = dir.path().join("report.json");
    let seed = format!("{}/", server.uri());

    let matches = command_argument_builder()
        .try_get_matches_from([
            "tether",
            seed.as_str(),
            "-d",
            pages.to_str().unwrap(),
            "-f",
            "json",
            "-o",
            report.to_str().unwrap(),
            "-q",
        ])
        .unwrap();

    let summary = handle_crawl(&matches).await.unwrap();
    assert_eq!(summary.rounds, 3);
    assert_eq!(std::fs::read_dir(&pages).unwrap().count(), 4);

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["rounds"], 3);
    assert_eq!(value["visited"].as_array().unwrap().len(), 4);
}
