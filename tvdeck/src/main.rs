use colored::Colorize;
use commands::command_argument_builder;
use tvdeck::handlers::{handle_icons, handle_render, handle_sample, handle_watch, init_tracing};

mod commands;

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    init_tracing(matches.get_flag("quiet"));

    let result = match matches.subcommand() {
        Some(("render", args)) => handle_render(args).await,
        Some(("watch", args)) => handle_watch(args).await,
        Some(("sample", args)) => handle_sample(args).await,
        Some(("icons", args)) => handle_icons(args).await,
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
