//! Drives every artifact in the manifest.
//!
//! The manifest is data; this module is the one loop that consumes it. In
//! production every artifact is registered in declaration order as its own
//! task and all results are collected before reporting. In development the
//! dev server and watcher come up first, then one session per artifact.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kiln_config::{BuildMode, KilnSettings, Manifest};

use crate::builder::{ArtifactBuilder, BuildHandle, CompletedBuild};
use crate::dev::{
    CompanionLauncher, DevContext, DevServer, DevServerState, FileWatcher, ShellLauncher,
};
use crate::engine::{CommandEngine, SharedEngine};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

pub struct Orchestrator {
    mode: BuildMode,
    root: PathBuf,
    settings: KilnSettings,
    manifest: Manifest,
    engine: SharedEngine,
    launcher: Arc<dyn CompanionLauncher>,
}

impl Orchestrator {
    pub fn new(
        mode: BuildMode,
        root: impl Into<PathBuf>,
        settings: KilnSettings,
        manifest: Manifest,
        engine: SharedEngine,
        launcher: Arc<dyn CompanionLauncher>,
    ) -> Self {
        Self {
            mode,
            root: root.into(),
            settings,
            manifest,
            engine,
            launcher,
        }
    }

    /// Orchestrator for the standard manifest with the command engine and
    /// shell-launched companion described by `settings`.
    pub fn from_settings(mode: BuildMode, root: PathBuf, settings: KilnSettings) -> Result<Self> {
        let manifest = Manifest::standard()?;
        let engine = Arc::new(CommandEngine::new(
            root.clone(),
            settings.engine_command.clone(),
            &settings.state_dir,
            mode,
        ));
        let launcher = Arc::new(ShellLauncher::new(&settings.companion, root.clone(), mode));
        Ok(Self::new(mode, root, settings, manifest, engine, launcher))
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn builder(&self) -> ArtifactBuilder {
        ArtifactBuilder::new(
            self.mode,
            self.root.clone(),
            self.settings.layout.clone(),
            self.engine.clone(),
        )
    }

    /// Run in the orchestrator's mode. Development runs until Ctrl+C.
    pub async fn run(&self) -> Result<()> {
        match self.mode {
            BuildMode::Production => self.run_production().await.map(|_| ()),
            BuildMode::Development => {
                self.run_development(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                        std::future::pending::<()>().await;
                    }
                })
                .await
            }
        }
    }

    /// Build every artifact once.
    ///
    /// All builds run to completion; any failure is reported and then turns
    /// into [`CliError::BuildsFailed`].
    pub async fn run_production(&self) -> Result<Vec<CompletedBuild>> {
        ui::info(&format!(
            "Building {} artifacts ({})",
            self.manifest.len(),
            self.mode
        ));

        let builder = self.builder();
        let mut tasks = Vec::with_capacity(self.manifest.len());
        for spec in &self.manifest {
            let builder = builder.clone();
            let task_spec = spec.clone();
            let task = tokio::spawn(async move { builder.build(&task_spec).await });
            tasks.push((spec.name.clone(), task));
        }

        let mut completed = Vec::with_capacity(tasks.len());
        let mut failures = 0;
        for (name, task) in tasks {
            match task.await {
                Ok(Ok(BuildHandle::Completed(build))) => {
                    ui::success(&format!(
                        "Built {} in {}",
                        build.artifact,
                        ui::format_duration(build.duration)
                    ));
                    completed.push(build);
                }
                Ok(Ok(BuildHandle::Watching(session))) => {
                    session.stop();
                    ui::error(&format!("{}: started a watch session in production", name));
                    failures += 1;
                }
                Ok(Err(e)) => {
                    ui::error(&e.to_string());
                    failures += 1;
                }
                Err(e) => {
                    ui::error(&format!("{}: build task failed: {}", name, e));
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            return Err(CliError::BuildsFailed { count: failures });
        }

        let rows: Vec<_> = completed
            .iter()
            .map(|build| ui::SummaryRow {
                artifact: build.artifact.clone(),
                target: build.target.engine_name().to_string(),
                size: build.output.total_size(),
                duration: build.duration,
            })
            .collect();
        ui::print_build_summary(&rows);

        Ok(completed)
    }

    /// Watch every artifact until `shutdown` resolves.
    pub async fn run_development<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let dev = &self.settings.dev;
        let out_dir = self.root.join(&self.settings.layout.out_dir);
        let state = Arc::new(DevServerState::new(out_dir));

        // The endpoint must be reachable before any session starts
        let server = DevServer::bind(&dev.host, dev.port, state.clone()).await?;
        let addr = server.local_addr()?;
        let mut server_task = tokio::spawn(server.serve());
        ui::success(&format!("Development server running at http://{}", addr));

        let mut ignore = dev.watch_ignore.clone();
        ignore.push(self.settings.layout.out_dir.to_string_lossy().into_owned());
        ignore.push(self.settings.state_dir.to_string_lossy().into_owned());
        let watcher =
            FileWatcher::new(self.root.clone(), ignore).context("Failed to start the file watcher")?;
        ui::info(&format!("Watching for changes in {}", watcher.root().display()));

        let context = DevContext {
            state,
            changes: watcher.changes(),
            debounce: Duration::from_millis(dev.debounce_ms),
            launcher: self.launcher.clone(),
        };
        let builder = self.builder().with_dev_context(context);

        let mut sessions = Vec::with_capacity(self.manifest.len());
        for spec in &self.manifest {
            let handle = match builder.build(spec).await {
                Ok(handle) => handle,
                Err(e) => {
                    server_task.abort();
                    return Err(e);
                }
            };
            tracing::debug!(artifact = %handle.artifact(), "artifact registered");
            if let BuildHandle::Watching(session) = handle {
                sessions.push(session);
            }
        }

        ui::info(&format!(
            "Watching {} artifacts. Press Ctrl+C to stop",
            sessions.len()
        ));

        let result = tokio::select! {
            _ = shutdown => {
                ui::info("Shutting down...");
                Ok(())
            }
            res = &mut server_task => match res {
                Ok(Ok(())) => Err(CliError::Server("server stopped unexpectedly".to_string())),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(CliError::Server(e.to_string())),
            },
        };

        drop(sessions);
        server_task.abort();
        result
    }
}
