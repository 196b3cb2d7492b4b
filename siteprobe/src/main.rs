use siteprobe::commands::command_argument_builder;
use siteprobe::handlers;
use siteprobe_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("scan", sub_matches)) => handlers::handle_scan(sub_matches).await,
        Some(("analyze", sub_matches)) => handlers::handle_analyze(sub_matches).await,
        Some(("perf", sub_matches)) => handlers::handle_perf(sub_matches).await,
        None => {
            // No subcommand provided, just show the banner
        }
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
