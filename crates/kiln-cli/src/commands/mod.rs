//! Command implementations.
//!
//! - [`build`] - run the orchestrator in the resolved mode
//! - [`plan`] - print the resolved build plan
//! - [`check`] - validate the manifest and entry files
//!
//! Every command starts from the same [`Project`]: the canonical project
//! root, its settings and the standard manifest.

pub mod build;
pub mod check;
pub mod plan;

use std::path::{Path, PathBuf};

use kiln_config::{KilnSettings, Manifest};

use crate::cli::{Cli, Command};
use crate::error::{Result, ResultExt};

/// A loaded project: where it lives and what to build.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub settings: KilnSettings,
    pub manifest: Manifest,
}

/// Resolve the project root and load its settings and manifest.
pub fn load_project(cwd: Option<&Path>, config: Option<&Path>) -> Result<Project> {
    let root = match cwd {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = root.canonicalize().with_hint(format!(
        "Check that {} exists, or pass --cwd with the project root",
        root.display()
    ))?;

    let settings = KilnSettings::load(&root, config)?;
    let manifest = Manifest::standard()?;
    tracing::debug!(root = %root.display(), artifacts = manifest.len(), "project loaded");

    Ok(Project {
        root,
        settings,
        manifest,
    })
}

/// Dispatch a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    let project = load_project(cli.cwd.as_deref(), cli.config.as_deref())?;

    match cli.command {
        Command::Build(args) => build::execute(project, args).await,
        Command::Plan(args) => plan::execute(project, args),
        Command::Check => check::execute(project),
    }
}
