use colored::Colorize;
use tether::commands::command_argument_builder;
use tether::handlers::{handle_crawl, init_logging, log_level};
use tether_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let matches = cmd.get_matches();
    let quiet = matches.get_flag("quiet");

    init_logging(log_level(quiet, matches.get_flag("verbose")));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if let Err(e) = handle_crawl(&matches).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
