use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tether_core::{CrawlOptions, ReportFormat, execute_crawl, render_report, write_report};
use tether_scanner::{CrawlSummary, parse_seed};
use tracing::{Level, debug};
use url::Url;

pub const PROMPT: &str = "Please enter a valid URL: ";
pub const INVALID_URL_MESSAGE: &str = "The URL provided is not valid. Please try again.";

// Helper functions for crawl handler

/// Parse a seed URL typed by the operator. Only absolute http(s) URLs with a
/// host are accepted.
pub fn parse_seed_url(line: &str) -> Option<Url> {
    match parse_seed(line) {
        Ok(url) => Some(url),
        Err(e) => {
            debug!("Rejected seed '{}': {}", line.trim(), e);
            None
        }
    }
}

/// Ask for a URL until a valid one is entered. End of input is an error.
pub fn prompt_for_url<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Url> {
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read a URL from stdin")?;
        if read == 0 {
            bail!("No valid URL was provided");
        }

        match parse_seed_url(&line) {
            Some(url) => return Ok(url),
            None => writeln!(output, "{}", INVALID_URL_MESSAGE)?,
        }
    }
}

/// Use the URL argument if it is valid, otherwise fall back to the prompt.
pub fn resolve_seed_from<R: BufRead, W: Write>(
    arg: Option<&str>,
    input: &mut R,
    output: &mut W,
) -> Result<Url> {
    if let Some(raw) = arg {
        if let Some(url) = parse_seed_url(raw) {
            return Ok(url);
        }
        writeln!(output, "{}", INVALID_URL_MESSAGE)?;
    }
    prompt_for_url(input, output)
}

pub fn resolve_seed(arg: Option<&str>) -> Result<Url> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    resolve_seed_from(arg, &mut input, &mut output)
}

/// Expand a leading `~` in the output directory.
pub fn expand_directory(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    PathBuf::from(expanded.as_ref())
}

pub fn log_level(quiet: bool, verbose: bool) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    }
}

pub fn init_logging(level: Level) {
    // Logs go to stderr so the summary on stdout stays clean
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Build crawl options from parsed arguments and a validated seed
pub fn crawl_options_from(matches: &ArgMatches, seed: &Url) -> CrawlOptions {
    let mut options = CrawlOptions::new(seed.as_str());

    if let Some(dir) = matches.get_one::<String>("directory") {
        options.directory = expand_directory(dir);
    }
    if let Some(threads) = matches.get_one::<u32>("threads") {
        options.threads = *threads as usize;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        options.timeout_secs = *timeout;
    }
    if let Some(retries) = matches.get_one::<u32>("retries") {
        options.retries = *retries;
    }
    options.max_pages = matches.get_one::<u32>("max-pages").map(|n| *n as usize);
    options.archive_duplicates = matches.get_flag("archive-duplicates");
    options.show_progress_bars = !matches.get_flag("quiet");

    options
}

pub fn report_format(matches: &ArgMatches) -> Result<ReportFormat> {
    matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text")
        .parse::<ReportFormat>()
        .map_err(|e| anyhow!(e))
}

pub async fn handle_crawl(matches: &ArgMatches) -> Result<CrawlSummary> {
    let quiet = matches.get_flag("quiet");
    let seed = resolve_seed(matches.get_one::<String>("URL").map(String::as_str))?;
    let options = crawl_options_from(matches, &seed);
    let format = report_format(matches)?;

    if !quiet {
        println!("{} Crawling {}", "→".blue(), seed.as_str().bright_white());
        println!("Workers: {}", options.threads);
        println!("Output: {}\n", options.directory.display());
    }

    let directory = options.directory.clone();
    let summary = execute_crawl(options, None)
        .await
        .with_context(|| format!("Crawl of {} could not start", seed))?;

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            write_report(&summary, format, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                println!(
                    "{} Report written to {}",
                    "✓".green().bold(),
                    path.display()
                );
            }
        }
        None => {
            println!("{}", render_report(&summary, format)?);
        }
    }

    if !quiet {
        println!(
            "{} {} page(s) stored in {}",
            "✓".green().bold(),
            summary.stored_count(),
            directory.display()
        );
    }

    Ok(summary)
}
