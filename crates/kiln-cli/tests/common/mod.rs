//! Shared fixtures for the kiln-cli integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kiln_cli::dev::{CompanionLauncher, DevContext, DevServerState, FileChange};
use kiln_cli::engine::{BundleEngine, BundleOutput, BundleRequest};
use kiln_cli::{BuildError, SpawnError};
use kiln_config::{Layout, Manifest};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::broadcast;

/// Engine that records every request and fails the artifacts it is told to.
#[derive(Default)]
pub struct ScriptedEngine {
    calls: Mutex<Vec<BundleRequest>>,
    failing: Mutex<HashSet<String>>,
}

impl ScriptedEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail(&self, artifact: &str) {
        self.failing.lock().insert(artifact.to_string());
    }

    pub fn recover(&self, artifact: &str) {
        self.failing.lock().remove(artifact);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|r| r.name.clone()).collect()
    }

    pub fn calls_for(&self, artifact: &str) -> usize {
        self.calls.lock().iter().filter(|r| r.name == artifact).count()
    }

    pub fn requests(&self) -> Vec<BundleRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl BundleEngine for ScriptedEngine {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BuildError> {
        self.calls.lock().push(request.clone());

        if self.failing.lock().contains(&request.name) {
            return Err(BuildError::Engine {
                artifact: request.name.clone(),
                status: "exit status: 1".to_string(),
                output: format!("cannot bundle {}", request.name),
            });
        }

        Ok(BundleOutput {
            files: vec![request.configuration.output_path.clone()],
        })
    }
}

/// Launcher that only counts launches.
#[derive(Default)]
pub struct CountingLauncher {
    launches: AtomicUsize,
}

impl CountingLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanionLauncher for CountingLauncher {
    fn describe(&self) -> String {
        "counting launcher".to_string()
    }

    async fn launch(&self) -> Result<(), SpawnError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher whose companion always exits during startup.
#[derive(Default)]
pub struct RefusingLauncher {
    attempts: AtomicUsize,
}

impl RefusingLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompanionLauncher for RefusingLauncher {
    fn describe(&self) -> String {
        "refusing launcher".to_string()
    }

    async fn launch(&self) -> Result<(), SpawnError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SpawnError::ExitedEarly {
            command: self.describe(),
            status: "exit status: 1".to_string(),
        })
    }
}

/// Temporary project with every entry file and page template in place.
pub fn scaffold_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let layout = Layout::default();
    let source = temp.path().join(&layout.source_dir);

    for spec in &Manifest::standard().unwrap() {
        write_file(&spec.entry.resolve(&source), "export {};\n");
        if let Some(page) = spec.page_file_name() {
            write_file(
                &temp.path().join(&layout.template_dir).join(page),
                "<html><body></body></html>\n",
            );
        }
    }

    fs_create(&temp.path().join(&layout.out_dir));
    temp
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs_create(parent);
    }
    std::fs::write(path, content).unwrap();
}

fn fs_create(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
}

/// Dev context over a hand-driven change feed, so tests decide when files
/// "change".
pub fn dev_context(
    root: &Path,
    launcher: Arc<dyn CompanionLauncher>,
) -> (DevContext, broadcast::Sender<FileChange>) {
    let (changes, _) = broadcast::channel(64);
    let context = DevContext {
        state: Arc::new(DevServerState::new(root.join("build"))),
        changes: changes.clone(),
        debounce: Duration::from_millis(20),
        launcher,
    };
    (context, changes)
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Every event a client has received so far, as JSON.
pub fn drain_events(rx: &mut tokio::sync::mpsc::Receiver<String>) -> Vec<serde_json::Value> {
    let mut events = Vec::new();
    while let Ok(raw) = rx.try_recv() {
        events.push(serde_json::from_str(&raw).unwrap());
    }
    events
}
