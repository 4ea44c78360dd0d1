// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub mod commands;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_options_from, expand_directory, handle_crawl, log_level, parse_seed_url,
    prompt_for_url, resolve_seed_from,
};

// Re-export crawl functionality from tether-core
pub use tether_core::crawl::{CrawlOptions, execute_crawl, extract_url_path};
pub use tether_core::report::{ReportFormat, generate_crawl_report};
