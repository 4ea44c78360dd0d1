pub mod crawl;
pub mod error;
pub mod report;
pub mod store;

use colored::Colorize;

pub use crawl::{
    CrawlOptions, CrawlProgressCallback, DEFAULT_DIRECTORY, execute_crawl, extract_url_path,
};
pub use error::CrawlError;
pub use report::{ReportFormat, generate_crawl_report, render_report, write_report};
pub use store::{DirectoryStore, StoreError, ensure_output_dir, page_filename};

pub fn print_banner() {
    println!(
        "{} {}",
        "tether".bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    println!("{}", "same-origin page mirror".bright_black());
    println!();
}
