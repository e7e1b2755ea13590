//! Artifact declarations.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::target::ExecutionTarget;

/// Kind of output unit. Decides the plugin set and the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Backend process bundle
    Server,
    /// Isolated preload script for the desktop host
    Preload,
    /// Standalone browser page
    WebPage,
    /// The application shell page rendered by the desktop host
    AppShell,
}

impl ArtifactKind {
    /// Whether the artifact emits an HTML page next to its bundle.
    pub fn is_page(self) -> bool {
        matches!(self, ArtifactKind::WebPage | ArtifactKind::AppShell)
    }

    /// The only execution target this kind can be compiled for.
    pub fn expected_target(self) -> ExecutionTarget {
        match self {
            ArtifactKind::Server => ExecutionTarget::Server,
            ArtifactKind::Preload | ArtifactKind::AppShell => ExecutionTarget::DesktopRenderer,
            ArtifactKind::WebPage => ExecutionTarget::Browser,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::Server => "server",
            ArtifactKind::Preload => "preload",
            ArtifactKind::WebPage => "web-page",
            ArtifactKind::AppShell => "app-shell",
        })
    }
}

/// Entry-point instruction handed to the engine.
///
/// An isolated entry bundles project files only (`> [path]`); a
/// non-isolated entry pulls its dependencies into the bundle too (`> path`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryInstruction {
    /// Source file relative to the source root
    pub path: PathBuf,
    pub isolated: bool,
}

impl EntryInstruction {
    pub fn isolated(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            isolated: true,
        }
    }

    pub fn with_dependencies(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            isolated: false,
        }
    }

    /// Location of the entry file on disk.
    pub fn resolve(&self, source_root: &Path) -> PathBuf {
        source_root.join(&self.path)
    }
}

impl fmt::Display for EntryInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Instructions always use forward slashes, whatever the host platform.
        let path = self.path.to_string_lossy().replace('\\', "/");
        if self.isolated {
            write!(f, "> [{path}]")
        } else {
            write!(f, "> {path}")
        }
    }
}

/// One named, independently buildable artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSpec {
    /// Unique name; output stem and template key
    pub name: String,
    pub target: ExecutionTarget,
    pub kind: ArtifactKind,
    pub entry: EntryInstruction,
}

impl ArtifactSpec {
    /// Create a spec, rejecting unusable names and kind/target mismatches.
    pub fn new(
        name: impl Into<String>,
        target: ExecutionTarget,
        kind: ArtifactKind,
        entry: EntryInstruction,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;

        if kind.expected_target() != target {
            return Err(ConfigError::TargetMismatch {
                artifact: name,
                kind,
                target,
            });
        }

        Ok(Self {
            name,
            target,
            kind,
            entry,
        })
    }

    /// Create a spec from a raw target string such as `browser@es6`.
    pub fn declare(
        name: impl Into<String>,
        target: &str,
        kind: ArtifactKind,
        entry: EntryInstruction,
    ) -> Result<Self> {
        Self::new(name, target.parse()?, kind, entry)
    }

    /// File name of the emitted bundle, e.g. `search.js`.
    pub fn bundle_file_name(&self) -> String {
        format!("{}.js", self.name)
    }

    /// File name of the emitted page, for page-producing kinds.
    pub fn page_file_name(&self) -> Option<String> {
        self.kind.is_page().then(|| format!("{}.html", self.name))
    }
}

/// Names become file stems, so they must be non-empty and path-free.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidArtifactName(name.to_string()))
    }
}
