//! Shared state for the development server.
//!
//! Per-artifact build status and the SSE client registry, behind
//! parking_lot locks. Sessions write, the HTTP handlers read.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::dev::HmrEvent;

/// Build status of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum BuildStatus {
    /// No build has been performed yet
    NotStarted,
    InProgress,
    Success { duration_ms: u64 },
    Failed { error: String },
}

impl BuildStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, BuildStatus::InProgress)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success { .. })
    }

    pub fn is_not_started(&self) -> bool {
        matches!(self, BuildStatus::NotStarted)
    }

    /// Get error message if failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            BuildStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Events buffered per client before it counts as unresponsive.
const CLIENT_QUEUE: usize = 100;

/// Connected SSE clients.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

pub struct DevServerState {
    /// Status per artifact, in registration order
    statuses: RwLock<IndexMap<String, BuildStatus>>,

    clients: ClientRegistry,

    next_client_id: RwLock<usize>,

    /// Directory served by the fallback route
    out_dir: PathBuf,
}

impl DevServerState {
    pub fn new(out_dir: PathBuf) -> Self {
        Self {
            statuses: RwLock::new(IndexMap::new()),
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            out_dir,
        }
    }

    /// Track an artifact. Keeps the current status if already tracked.
    pub fn register_artifact(&self, artifact: &str) {
        self.statuses
            .write()
            .entry(artifact.to_string())
            .or_insert(BuildStatus::NotStarted);
    }

    pub fn start_build(&self, artifact: &str) {
        self.set_status(artifact, BuildStatus::InProgress);
    }

    pub fn complete_build(&self, artifact: &str, duration: Duration) {
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.set_status(artifact, BuildStatus::Success { duration_ms });
    }

    pub fn fail_build(&self, artifact: &str, error: String) {
        self.set_status(artifact, BuildStatus::Failed { error });
    }

    fn set_status(&self, artifact: &str, status: BuildStatus) {
        self.statuses.write().insert(artifact.to_string(), status);
    }

    /// Status of one artifact; untracked artifacts report `NotStarted`.
    pub fn status(&self, artifact: &str) -> BuildStatus {
        self.statuses
            .read()
            .get(artifact)
            .cloned()
            .unwrap_or(BuildStatus::NotStarted)
    }

    /// Snapshot of every tracked artifact's status.
    pub fn statuses(&self) -> IndexMap<String, BuildStatus> {
        self.statuses.read().clone()
    }

    /// Register a new SSE client.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(CLIENT_QUEUE);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to every connected client without waiting.
    ///
    /// A client whose queue is full or closed is dropped; its EventSource
    /// reconnects on its own.
    pub fn broadcast(&self, event: &HmrEvent) {
        let Some(json) = encode(event) else {
            return;
        };

        let clients = self.clients.read().clone();
        tracing::trace!(artifact = ?event.artifact(), clients = clients.len(), "broadcasting HMR event");

        let failed_ids: Vec<_> = clients
            .into_iter()
            .filter(|(_, tx)| !deliver(tx, json.clone()))
            .map(|(id, _)| id)
            .collect();

        for id in failed_ids {
            tracing::debug!(client = id, "dropping unresponsive HMR client");
            self.unregister_client(id);
        }
    }

    /// Send an event to one client. Returns false if it is gone.
    pub fn send_to(&self, id: usize, event: &HmrEvent) -> bool {
        let Some(json) = encode(event) else {
            return false;
        };
        let Some(tx) = self.clients.read().get(&id).cloned() else {
            return false;
        };

        if deliver(&tx, json) {
            true
        } else {
            self.unregister_client(id);
            false
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

pub type SharedState = Arc<DevServerState>;

fn encode(event: &HmrEvent) -> Option<String> {
    serde_json::to_string(event)
        .map_err(|e| tracing::warn!(error = %e, "failed to serialize HMR event"))
        .ok()
}

fn deliver(tx: &mpsc::Sender<String>, json: String) -> bool {
    match tx.try_send(json) {
        Ok(()) => true,
        Err(TrySendError::Full(_) | TrySendError::Closed(_)) => false,
    }
}
