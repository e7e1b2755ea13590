//! Development mode.
//!
//! - [`DevServer`] serves the output directory and pushes [`HmrEvent`]s over
//!   Server-Sent Events
//! - [`FileWatcher`] fans source changes out to every session
//! - [`DevSession`] is one artifact's watch loop
//! - [`DevProcessSupervisor`] launches the companion process for the app shell

pub mod error_overlay;
pub mod server;
pub mod session;
pub mod state;
pub mod supervisor;
pub mod watcher;

pub use server::DevServer;
pub use session::{DevContext, DevSession};
pub use state::{BuildStatus, DevServerState, SharedState};
pub use supervisor::{CompanionLauncher, DevProcessSupervisor, ShellLauncher};
pub use watcher::{FileChange, FileWatcher};

use serde::{Deserialize, Serialize};

/// Events pushed to connected HMR clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HmrEvent {
    /// Client connected
    Connected { id: usize },

    BuildStarted { artifact: String },

    /// Live-patch the artifact's changed output files
    Update { artifact: String, files: Vec<String> },

    /// Reload every page showing the artifact
    Reload { artifact: String },

    BuildFailed { artifact: String, error: String },
}

impl HmrEvent {
    pub fn artifact(&self) -> Option<&str> {
        match self {
            HmrEvent::Connected { .. } => None,
            HmrEvent::BuildStarted { artifact }
            | HmrEvent::Update { artifact, .. }
            | HmrEvent::Reload { artifact }
            | HmrEvent::BuildFailed { artifact, .. } => Some(artifact),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(HmrEvent::Update {
            artifact: "app".into(),
            files: vec!["app.js".into()],
        })
        .unwrap();
        assert_eq!(json["type"], "update");
        assert_eq!(json["files"][0], "app.js");

        let json = serde_json::to_value(HmrEvent::BuildFailed {
            artifact: "search".into(),
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "build-failed");
    }
}
