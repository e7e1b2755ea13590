//! kiln - build orchestrator for desktop and web artifacts.
//!
//! Parses arguments, sets up logging and colors, then dispatches.

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(
        args.verbose,
        args.quiet,
        args.no_color || !logger::should_use_colors(),
    );
    ui::init_colors(args.no_color);

    // Convert CLI errors to miette diagnostics for error reporting
    commands::execute(args)
        .await
        .map_err(error::cli_error_to_miette)
}
