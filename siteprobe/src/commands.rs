use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("siteprobe")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("siteprobe")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about("Scan a site and print the full page-by-page report")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Root URL to scan (scheme optional, https assumed)"),
                )
                .arg(
                    arg!(-m --"max-pages" <N>)
                        .required(false)
                        .help("Maximum number of pages to analyze (0 = unbounded)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"include-subdomains")
                        .required(false)
                        .help("Treat subdomain links as internal")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        )
        .subcommand(
            command!("analyze")
                .about("Run a site analysis as a background job and watch its progress")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Root URL to analyze"),
                )
                .arg(
                    arg!(-m --"max-pages" <N>)
                        .required(false)
                        .help("Maximum number of pages to analyze (0 = unbounded)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"include-subdomains")
                        .required(false)
                        .help("Treat subdomain links as internal")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the final job snapshot as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("perf")
                .about("Analyze page performance and Core Web Vitals for one URL")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("URL to analyze"),
                )
                .arg(
                    arg!(-d --"device" <DEVICE>)
                        .required(false)
                        .help("Device profile to simulate")
                        .value_parser(["desktop", "mobile"])
                        .default_value("desktop"),
                )
                .arg(
                    arg!(--"json")
                        .required(false)
                        .help("Print the raw report as JSON")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
