//! Development watch session for one artifact.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kiln_config::{HmrReload, Lifecycle};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::builder::PreparedArtifact;
use crate::dev::{
    CompanionLauncher, DevProcessSupervisor, FileChange, HmrEvent, SharedState,
};
use crate::engine::{BundleOutput, SharedEngine};
use crate::ui;

/// Handles shared by every session of one dev run.
#[derive(Clone)]
pub struct DevContext {
    pub state: SharedState,
    /// Change feed from the project watcher
    pub changes: broadcast::Sender<FileChange>,
    /// Quiet period collapsing a burst of changes into one rebuild
    pub debounce: Duration,
    pub launcher: Arc<dyn CompanionLauncher>,
}

/// A running watch loop. Dropping the session stops it.
pub struct DevSession {
    artifact: String,
    lifecycle: Lifecycle,
    supervisor: Option<Arc<DevProcessSupervisor>>,
    tasks: Vec<JoinHandle<()>>,
}

impl DevSession {
    /// Start watching: initial build now, one rebuild per debounced change.
    pub fn start(prepared: PreparedArtifact, engine: SharedEngine, context: DevContext) -> Self {
        let artifact = prepared.name().to_string();
        let lifecycle = prepared.lifecycle;
        context.state.register_artifact(&artifact);

        let supervisor = lifecycle
            .supervises_companion()
            .then(|| DevProcessSupervisor::new(context.launcher.clone()));

        let mut tasks = Vec::with_capacity(2);
        if let Some(supervisor) = &supervisor {
            tasks.push(supervisor.start());
        }

        // Subscribe before the initial build so no change is missed
        let changes = context.changes.subscribe();
        let watch_loop = WatchLoop {
            prepared,
            engine,
            state: context.state,
            supervisor: supervisor.clone(),
            debounce: context.debounce,
        };
        tasks.push(tokio::spawn(watch_loop.run(changes)));

        Self {
            artifact,
            lifecycle,
            supervisor,
            tasks,
        }
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_watching(&self) -> bool {
        self.lifecycle.is_watching()
    }

    pub fn hot_reload_enabled(&self) -> bool {
        self.lifecycle.hot_reload().is_some()
    }

    /// The companion supervisor, for the app shell only.
    pub fn supervisor(&self) -> Option<&Arc<DevProcessSupervisor>> {
        self.supervisor.as_ref()
    }

    /// Whether this session's companion process is up. A failed launch
    /// does not count.
    pub fn has_supervised_process(&self) -> bool {
        self.supervisor.as_ref().is_some_and(|s| s.has_launched())
    }

    pub fn stop(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

impl Drop for DevSession {
    fn drop(&mut self) {
        self.stop();
    }
}

struct WatchLoop {
    prepared: PreparedArtifact,
    engine: SharedEngine,
    state: SharedState,
    supervisor: Option<Arc<DevProcessSupervisor>>,
    debounce: Duration,
}

impl WatchLoop {
    async fn run(self, mut changes: broadcast::Receiver<FileChange>) {
        self.build().await;

        loop {
            match changes.recv().await {
                Ok(change) if self.is_relevant(change.path()) => {
                    tracing::debug!(
                        artifact = %self.prepared.name(),
                        path = %change.path().display(),
                        "change detected"
                    );
                }
                Ok(_) => continue,
                // Missed events still mean something changed
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(artifact = %self.prepared.name(), skipped, "change feed lagged");
                }
                Err(RecvError::Closed) => break,
            }

            tokio::time::sleep(self.debounce).await;
            loop {
                match changes.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }

            self.build().await;
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        self.prepared
            .watch_roots
            .iter()
            .any(|root| path.starts_with(root))
    }

    async fn build(&self) {
        let artifact = self.prepared.name().to_string();
        self.state.start_build(&artifact);
        self.state.broadcast(&HmrEvent::BuildStarted {
            artifact: artifact.clone(),
        });

        let started = Instant::now();
        match self.prepared.bundle(self.engine.as_ref()).await {
            Ok(output) => {
                let elapsed = started.elapsed();
                self.state.complete_build(&artifact, elapsed);
                ui::success(&format!(
                    "Built {} in {}",
                    artifact,
                    ui::format_duration(elapsed)
                ));

                if let Some(supervisor) = &self.supervisor {
                    supervisor.notify_success();
                }

                if let Some(event) = self.success_event(&output) {
                    self.state.broadcast(&event);
                }
            }
            Err(e) => {
                let error = e.to_string();
                self.state.fail_build(&artifact, error.clone());
                ui::error(&error);
                self.state
                    .broadcast(&HmrEvent::BuildFailed { artifact, error });
            }
        }
    }

    /// What clients are told after a successful build, per lifecycle.
    fn success_event(&self, output: &BundleOutput) -> Option<HmrEvent> {
        let artifact = self.prepared.name().to_string();
        match self.prepared.lifecycle.hot_reload()? {
            HmrReload::LivePatch => Some(HmrEvent::Update {
                artifact,
                files: output.file_names(),
            }),
            HmrReload::FullReload => Some(HmrEvent::Reload { artifact }),
        }
    }
}
