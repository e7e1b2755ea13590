//! kiln CLI - build orchestrator for a desktop application and its pages.
//!
//! The CLI consumes the fixed artifact manifest from `kiln-config` and
//! drives an external bundling engine for every artifact:
//!
//! - [`orchestrator`] - one loop over the manifest for both modes
//! - [`builder`] - per-artifact configuration, entry checks and lifecycle
//! - [`engine`] - the bundling engine seam and its command implementation
//! - [`dev`] - dev server, file watcher, watch sessions and the companion
//!   process supervisor
//! - [`error`] - error types and miette conversion
//! - [`logger`] / [`ui`] - tracing setup and terminal output
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::orchestrator::Orchestrator;
//! use kiln_config::{BuildMode, KilnSettings};
//!
//! # async fn run() -> kiln_cli::Result<()> {
//! let root = std::env::current_dir()?;
//! let settings = KilnSettings::load(&root, None)?;
//! Orchestrator::from_settings(BuildMode::Production, root, settings)?
//!     .run_production()
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod cli;
pub mod commands;
pub mod dev;
pub mod engine;
pub mod error;
pub mod logger;
pub mod orchestrator;
pub mod ui;

// Re-export commonly used types
pub use error::{BuildError, CliError, ConfigError, Result, ResultExt, SpawnError};
