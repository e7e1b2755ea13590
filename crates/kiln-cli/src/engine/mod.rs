//! The bundling engine seam.
//!
//! kiln never bundles anything itself. Every artifact is handed to a
//! [`BundleEngine`] as a [`BundleRequest`]; the shipped implementation runs an
//! external command ([`CommandEngine`]), tests script their own.

mod command;

pub use command::{ARTIFACT_ENV_VAR, CommandEngine, REQUEST_ENV_VAR};
pub(crate) use command::shell;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use kiln_config::{ArtifactSpec, Configuration};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Everything the engine needs to bundle one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleRequest {
    pub name: String,
    /// Rendered entry instruction, `> [path]` or `> path`
    pub instruction: String,
    pub configuration: Configuration,
}

impl BundleRequest {
    pub fn new(spec: &ArtifactSpec, configuration: Configuration) -> Self {
        Self {
            name: spec.name.clone(),
            instruction: spec.entry.to_string(),
            configuration,
        }
    }
}

/// Files a successful bundle run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOutput {
    pub files: Vec<PathBuf>,
}

impl BundleOutput {
    /// Output file names, as served by the dev server.
    pub fn file_names(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|f| f.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    /// Combined size of the outputs that still exist on disk.
    pub fn total_size(&self) -> u64 {
        self.files
            .iter()
            .filter_map(|f| std::fs::metadata(f).ok())
            .map(|m| m.len())
            .sum()
    }
}

#[async_trait]
pub trait BundleEngine: Send + Sync {
    /// Bundle one artifact. Called again for every rebuild.
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BuildError>;
}

pub type SharedEngine = Arc<dyn BundleEngine>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_strip_directories() {
        let output = BundleOutput {
            files: vec![
                PathBuf::from("/project/build/app.js"),
                PathBuf::from("/project/build/app.js.map"),
            ],
        };
        assert_eq!(output.file_names(), ["app.js", "app.js.map"]);
        assert_eq!(output.total_size(), 0);
    }
}
