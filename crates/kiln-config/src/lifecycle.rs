//! Lifecycle policy: how each artifact kind is driven in each mode.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactKind;
use crate::mode::BuildMode;

/// What connected clients do after a successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HmrReload {
    /// Swap changed modules in place
    LivePatch,
    /// Reload the whole page
    FullReload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Lifecycle {
    /// Build once and finish
    RunOnce,
    /// Initial build, then rebuild on every change
    Watch,
    /// Watch and notify connected clients
    WatchHmr { reload: HmrReload },
    /// Live-patching watch that also launches the companion process once
    WatchHmrSupervised,
}

impl Lifecycle {
    pub fn select(kind: ArtifactKind, mode: BuildMode) -> Self {
        match (mode, kind) {
            (BuildMode::Production, _) => Lifecycle::RunOnce,
            (BuildMode::Development, ArtifactKind::Server | ArtifactKind::Preload) => {
                Lifecycle::Watch
            }
            (BuildMode::Development, ArtifactKind::WebPage) => Lifecycle::WatchHmr {
                reload: HmrReload::FullReload,
            },
            (BuildMode::Development, ArtifactKind::AppShell) => Lifecycle::WatchHmrSupervised,
        }
    }

    pub fn is_watching(self) -> bool {
        !matches!(self, Lifecycle::RunOnce)
    }

    /// Client reload behaviour, when hot reload is enabled.
    pub fn hot_reload(self) -> Option<HmrReload> {
        match self {
            Lifecycle::RunOnce | Lifecycle::Watch => None,
            Lifecycle::WatchHmr { reload } => Some(reload),
            Lifecycle::WatchHmrSupervised => Some(HmrReload::LivePatch),
        }
    }

    pub fn supervises_companion(self) -> bool {
        matches!(self, Lifecycle::WatchHmrSupervised)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::RunOnce => f.write_str("run once"),
            Lifecycle::Watch => f.write_str("watch"),
            Lifecycle::WatchHmr {
                reload: HmrReload::FullReload,
            } => f.write_str("watch + hmr (reload)"),
            Lifecycle::WatchHmr {
                reload: HmrReload::LivePatch,
            } => f.write_str("watch + hmr"),
            Lifecycle::WatchHmrSupervised => f.write_str("watch + hmr + companion"),
        }
    }
}
