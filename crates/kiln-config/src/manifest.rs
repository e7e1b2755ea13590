//! The fixed artifact manifest.
//!
//! The manifest is plain data: an ordered table of declarations that is
//! validated as a whole before any build starts. Declaration order is the
//! order in which artifacts are registered with the engine.

use std::collections::HashSet;

use crate::artifact::{ArtifactKind, ArtifactSpec, EntryInstruction};
use crate::error::{ConfigError, Result};

/// Raw, unvalidated artifact declaration.
#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    pub name: &'static str,
    /// Target string, e.g. `browser@es6`
    pub target: &'static str,
    pub kind: ArtifactKind,
    /// Entry file relative to the source root
    pub entry: &'static str,
    pub isolated: bool,
}

impl Declaration {
    fn to_spec(self) -> Result<ArtifactSpec> {
        let entry = if self.isolated {
            EntryInstruction::isolated(self.entry)
        } else {
            EntryInstruction::with_dependencies(self.entry)
        };
        ArtifactSpec::declare(self.name, self.target, self.kind, entry)
    }
}

const fn page(name: &'static str, entry: &'static str) -> Declaration {
    Declaration {
        name,
        target: "browser@es6",
        kind: ArtifactKind::WebPage,
        entry,
        isolated: false,
    }
}

const fn preload(name: &'static str, entry: &'static str) -> Declaration {
    Declaration {
        name,
        target: "electron",
        kind: ArtifactKind::Preload,
        entry,
        isolated: true,
    }
}

/// Every artifact kiln builds, in registration order.
pub const STANDARD_DECLARATIONS: &[Declaration] = &[
    page("newtab", "renderer/externals/newtab/index.tsx"),
    page("settings", "renderer/externals/settings/index.tsx"),
    page("search", "renderer/externals/search/index.tsx"),
    Declaration {
        name: "app",
        target: "electron",
        kind: ArtifactKind::AppShell,
        entry: "renderer/app/index.tsx",
        isolated: true,
    },
    preload("view-preload", "preloads/view-preload.ts"),
    preload("background-preload", "preloads/background-preload.ts"),
    Declaration {
        name: "main",
        target: "server",
        kind: ArtifactKind::Server,
        entry: "main/index.ts",
        isolated: true,
    },
];

/// Ordered, validated set of artifacts with unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    artifacts: Vec<ArtifactSpec>,
}

impl Manifest {
    /// Validate a list of specs. Fails closed on the first duplicated name.
    pub fn new(artifacts: Vec<ArtifactSpec>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(artifacts.len());
        for spec in &artifacts {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateArtifact(spec.name.clone()));
            }
        }
        Ok(Self { artifacts })
    }

    /// Parse and validate a declaration table.
    pub fn declare(declarations: &[Declaration]) -> Result<Self> {
        let specs = declarations
            .iter()
            .map(|d| d.to_spec())
            .collect::<Result<Vec<_>>>()?;
        Self::new(specs)
    }

    /// The fixed manifest: three web pages, the app shell, two preloads and
    /// the server bundle.
    pub fn standard() -> Result<Self> {
        Self::declare(STANDARD_DECLARATIONS)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArtifactSpec> {
        self.artifacts.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ArtifactSpec> {
        self.artifacts.iter().find(|spec| spec.name == name)
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ArtifactSpec;
    type IntoIter = std::slice::Iter<'a, ArtifactSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
