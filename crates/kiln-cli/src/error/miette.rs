//! Miette report conversion for CLI errors.

use crate::error::{BuildError, CliError};
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => build_error_to_miette(e),
        CliError::Config(e) => miette::miette!(
            help = "The artifact manifest and kiln.config.json are read before any build starts",
            "Configuration error: {}",
            e
        ),
        CliError::BuildsFailed { count } => miette::miette!(
            help = "Each failure is listed above",
            "{} artifact build(s) failed",
            count
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert BuildError to miette Report
pub fn build_error_to_miette(err: BuildError) -> Report {
    match err {
        BuildError::Engine {
            artifact,
            status,
            output,
        } => miette::miette!(
            help = "Run the engine command by hand with KILN_BUNDLE_REQUEST set to reproduce",
            "Bundling '{}' failed ({})\n{}",
            artifact,
            status,
            output
        ),
        _ => miette::miette!("{}", err),
    }
}
