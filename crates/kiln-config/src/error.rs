//! Error types for manifest declaration, configuration building and settings loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::ArtifactKind;
use crate::target::ExecutionTarget;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Declaration errors (manifest is fixed, so these indicate a code defect)
    #[error("invalid execution target: {0:?} (expected server, electron or browser)")]
    InvalidTarget(String),

    #[error("invalid artifact name: {0:?}")]
    InvalidArtifactName(String),

    #[error("artifact '{artifact}' is a {kind} artifact and cannot target {target}")]
    TargetMismatch {
        artifact: String,
        kind: ArtifactKind,
        target: ExecutionTarget,
    },

    #[error("artifact '{0}' is declared more than once")]
    DuplicateArtifact(String),

    #[error("invalid plugin pipeline for '{artifact}': {reason}")]
    InvalidPipeline { artifact: String, reason: String },

    // Settings loading errors
    #[error("failed to load settings from {}: {message}", .path.display())]
    Load { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
