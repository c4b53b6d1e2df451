use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;

/// Options shared by every subcommand that renders a page.
fn deck_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(-o --"output" <PATH>)
            .required(false)
            .help("Where to write the rendered page")
            .value_parser(clap::value_parser!(PathBuf))
            .default_value("tvdeck.html"),
    )
    .arg(
        arg!(--"folder" <NAME>)
            .required(false)
            .help("Bookmark folder to show (default: TV)"),
    )
    .arg(
        arg!(--"icons-dir" <DIR>)
            .required(false)
            .help("Directory holding local icon files (default: icons)"),
    )
    .arg(
        arg!(--"catalog" <SOURCE>)
            .required(false)
            .help("JSON list of icon names, as a file path or URL (default: scan --icons-dir)"),
    )
    .arg(
        arg!(-c --"config" <FILE>)
            .required(false)
            .help("JSON configuration file"),
    )
    .arg(
        arg!(--"offline")
            .required(false)
            .help("Only use local icons; never contact favicon or logo services")
            .action(clap::ArgAction::SetTrue),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("tvdeck")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("tvdeck")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Only log warnings and errors").required(false))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(deck_args(
            command!("render")
                .about("Render the bookmark folder once as an HTML card grid")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Bookmarks file (default: the browser's profile location)"),
                ),
        ))
        .subcommand(deck_args(
            command!("watch")
                .about("Render, then redraw whenever the bookmarks file changes")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Bookmarks file (default: the browser's profile location)"),
                )
                .arg(
                    arg!(-i --"interval" <MILLIS>)
                        .required(false)
                        .help("Milliseconds between checks (default: 2000)")
                        .value_parser(clap::value_parser!(u64).range(100..)),
                ),
        ))
        .subcommand(deck_args(
            command!("sample").about("Render the built-in sample bookmarks"),
        ))
        .subcommand(
            command!("icons")
                .about("Write the JSON list of icon names found in an icon directory")
                .arg(
                    arg!([DIR])
                        .required(false)
                        .help("Icon directory, created when missing")
                        .default_value("icons"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Where to write the list")
                        .value_parser(clap::value_parser!(PathBuf))
                        .default_value("icons-list.json"),
                ),
        )
}
