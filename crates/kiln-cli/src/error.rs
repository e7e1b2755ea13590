//! Error handling for the kiln CLI.
//!
//! Errors are layered: domain errors (`BuildError`, `SpawnError` and the
//! configuration errors from `kiln-config`) convert into the top-level
//! `CliError` via `#[from]`. `main` turns a `CliError` into a miette report.
//!
//! In development mode, build and spawn errors never reach `main`; the
//! session that hit them logs them and keeps watching.

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;

pub use kiln_config::ConfigError;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest, pipeline or settings errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    /// Companion process could not be started
    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more production builds failed; each was reported already
    #[error("{count} artifact build(s) failed")]
    BuildsFailed { count: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Custom(String),
}

/// Errors from building a single artifact.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The entry instruction does not point at an existing file
    #[error("Entry point for '{artifact}' not found: {}\n\nHint: Check that the file exists under the source directory", .path.display())]
    EntryNotFound { artifact: String, path: PathBuf },

    /// The bundling engine exited unsuccessfully
    #[error("Bundling '{artifact}' failed ({status})\n{output}")]
    Engine {
        artifact: String,
        status: String,
        output: String,
    },

    /// The engine request could not be written or the engine not started
    #[error("Failed to hand '{artifact}' to the bundling engine: {message}")]
    Request { artifact: String, message: String },

    /// The engine reported success but the bundle is missing
    #[error("Engine produced no bundle for '{artifact}': expected {}", .path.display())]
    Output { artifact: String, path: PathBuf },
}

impl BuildError {
    pub fn artifact(&self) -> &str {
        match self {
            BuildError::EntryNotFound { artifact, .. }
            | BuildError::Engine { artifact, .. }
            | BuildError::Request { artifact, .. }
            | BuildError::Output { artifact, .. } => artifact,
        }
    }
}

/// Errors from launching the companion process.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited unsuccessfully inside the startup grace period
    #[error("`{command}` exited during startup ({status})")]
    ExitedEarly { command: String, status: String },
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Append a hint line to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_not_found_message() {
        let err = BuildError::EntryNotFound {
            artifact: "main".to_string(),
            path: PathBuf::from("src/main/index.ts"),
        };
        let msg = err.to_string();
        assert!(msg.contains("'main'"));
        assert!(msg.contains("src/main/index.ts"));
        assert!(msg.contains("Hint:"));
        assert_eq!(err.artifact(), "main");
    }

    #[test]
    fn test_engine_error_carries_output() {
        let err = BuildError::Engine {
            artifact: "search".to_string(),
            status: "exit status: 2".to_string(),
            output: "Cannot resolve './missing'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit status: 2"));
        assert!(msg.contains("./missing"));
    }

    #[test]
    fn test_cli_error_conversions() {
        let err: CliError = ConfigError::DuplicateArtifact("app".into()).into();
        assert!(matches!(err, CliError::Config(_)));

        let err: CliError = SpawnError::ExitedEarly {
            command: "npm start".into(),
            status: "exit status: 1".into(),
        }
        .into();
        assert!(matches!(err, CliError::Spawn(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), BuildError> = Err(BuildError::Request {
            artifact: "app".into(),
            message: "permission denied".into(),
        });
        let msg = result.with_hint("Check the state directory").unwrap_err().to_string();
        assert!(msg.contains("permission denied"));
        assert!(msg.contains("Hint: Check the state directory"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("boom"));
        let msg = result.context("Failed to start watcher").unwrap_err().to_string();
        assert!(msg.starts_with("Failed to start watcher: "));
    }

    #[test]
    fn test_builds_failed_message() {
        assert_eq!(
            CliError::BuildsFailed { count: 2 }.to_string(),
            "2 artifact build(s) failed"
        );
    }
}
