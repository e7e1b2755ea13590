use clap::{Args, Subcommand, ValueEnum};
use kiln_config::BuildMode;

use crate::cli::validation::parse_engine_command;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every artifact
    ///
    /// In production (the default) each artifact is built once and the
    /// command fails if any build fails. With NODE_ENV=development kiln
    /// starts the dev server, watches the project and rebuilds on change.
    Build(BuildArgs),

    /// Print the resolved build plan as JSON
    ///
    /// Shows each artifact's target, lifecycle, entry instruction and full
    /// engine configuration without running the engine.
    Plan(PlanArgs),

    /// Validate the manifest and check that every entry file exists
    Check,
}

#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Dev server port (overrides settings)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Engine command (overrides settings)
    #[arg(long, value_name = "COMMAND", value_parser = parse_engine_command)]
    pub engine: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct PlanArgs {
    /// Mode to plan for (defaults to the one NODE_ENV selects)
    #[arg(long, value_enum, value_name = "MODE")]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Development,
    Production,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Development => BuildMode::Development,
            ModeArg::Production => BuildMode::Production,
        }
    }
}
