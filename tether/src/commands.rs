use clap::arg;
use tether_core::DEFAULT_DIRECTORY;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("tether")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tether")
        .about(
            "Crawl every page reachable from a seed URL on the same origin and store each \
            distinct HTML page on disk.",
        )
        .styles(CLAP_STYLING)
        .arg(
            arg!([URL])
                .required(false)
                .help("The seed URL. You will be prompted for one if it is missing or invalid"),
        )
        .arg(
            arg!(-d --"directory" <DIR>)
                .required(false)
                .help("Directory to store downloaded pages in")
                .default_value(DEFAULT_DIRECTORY),
        )
        .arg(
            arg!(-t --"threads" <NUM_WORKERS>)
                .required(false)
                .help("Maximum number of concurrent fetches per round")
                .value_parser(clap::value_parser!(u32).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Request timeout in seconds")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("10"),
        )
        .arg(
            arg!(--"retries" <NUM>)
                .required(false)
                .help("Retries for timeouts and connection errors")
                .value_parser(clap::value_parser!(u32))
                .default_value("0"),
        )
        .arg(
            arg!(--"max-pages" <NUM>)
                .required(false)
                .help("Stop scheduling new URLs once this many have been visited or queued")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            arg!(--"archive-duplicates")
                .required(false)
                .help("Also store pages whose content was already seen under another URL")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Summary format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            arg!(-o --"output" <PATH>)
                .required(false)
                .help("Save the summary to a file (default: display to screen)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress and non-essential output")
                .required(false)
                .conflicts_with("verbose"),
        )
        .arg(arg!(-v --"verbose" "Log debug output to stderr").required(false))
}
