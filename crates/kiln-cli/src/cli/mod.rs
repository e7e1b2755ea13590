//! Command-line interface definition.
//!
//! - `kiln build` - run every artifact in the mode selected by `NODE_ENV`
//! - `kiln plan` - print resolved lifecycles and configurations as JSON
//! - `kiln check` - validate the manifest and entry files

mod commands;
mod tests;
mod validation;

use std::path::PathBuf;

use clap::Parser;

pub use commands::{BuildArgs, Command, ModeArg, PlanArgs};
pub use validation::parse_engine_command;

/// kiln - build orchestrator for desktop and web artifacts
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Build orchestrator for desktop and web artifacts",
    long_about = "kiln drives the bundling engine for every artifact of the application:\n\
                  the server bundle, the desktop app shell and its preloads, and the\n\
                  standalone browser pages. NODE_ENV=development switches to watch mode\n\
                  with hot reload and launches the desktop host once the shell is built."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Settings file (defaults to kiln.config.json in the project root)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}
