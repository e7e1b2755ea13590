//! Companion process supervision for the app shell.
//!
//! The desktop host (`npm start`) loads the app shell from the dev server, so
//! it may only start once the shell has been built. The supervisor waits for
//! the first successful build and then launches the companion exactly once;
//! later rebuilds reach the running host through HMR.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kiln_config::{BuildMode, CompanionSettings, MODE_ENV_VAR};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::engine::shell;
use crate::error::SpawnError;
use crate::ui;

/// An exit inside this window counts as a failed launch.
pub const STARTUP_GRACE: Duration = Duration::from_millis(500);

/// Starts the companion process.
#[async_trait]
pub trait CompanionLauncher: Send + Sync {
    /// Human readable command, for logs
    fn describe(&self) -> String;

    /// Launch the process. Returns once it is known to be up.
    async fn launch(&self) -> Result<(), SpawnError>;
}

/// Runs the companion through the platform shell with inherited stdio.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    command_line: String,
    cwd: PathBuf,
    mode: BuildMode,
    grace: Duration,
}

impl ShellLauncher {
    pub fn new(settings: &CompanionSettings, cwd: impl Into<PathBuf>, mode: BuildMode) -> Self {
        Self {
            command_line: settings.command_line(),
            cwd: cwd.into(),
            mode,
            grace: STARTUP_GRACE,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

#[async_trait]
impl CompanionLauncher for ShellLauncher {
    fn describe(&self) -> String {
        self.command_line.clone()
    }

    async fn launch(&self) -> Result<(), SpawnError> {
        let mut child = shell(&self.command_line)
            .current_dir(&self.cwd)
            .env(MODE_ENV_VAR, self.mode.as_str())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SpawnError::Launch {
                command: self.command_line.clone(),
                source,
            })?;

        match tokio::time::timeout(self.grace, child.wait()).await {
            Ok(Ok(status)) if !status.success() => Err(SpawnError::ExitedEarly {
                command: self.command_line.clone(),
                status: status.to_string(),
            }),
            Ok(Ok(_)) => {
                ui::warning(&format!("`{}` exited right after starting", self.command_line));
                Ok(())
            }
            Ok(Err(source)) => Err(SpawnError::Launch {
                command: self.command_line.clone(),
                source,
            }),
            Err(_still_running) => {
                let command = self.command_line.clone();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if status.success() => {
                            ui::info(&format!("`{}` exited", command));
                        }
                        Ok(status) => {
                            ui::warning(&format!("`{}` exited ({})", command, status));
                        }
                        Err(e) => {
                            tracing::warn!(%command, error = %e, "lost track of companion process");
                        }
                    }
                });
                Ok(())
            }
        }
    }
}

/// Launches the companion after the first successful app-shell build.
pub struct DevProcessSupervisor {
    launcher: Arc<dyn CompanionLauncher>,
    first_success: watch::Sender<bool>,
    spawned: AtomicBool,
    launched: AtomicBool,
}

impl DevProcessSupervisor {
    pub fn new(launcher: Arc<dyn CompanionLauncher>) -> Arc<Self> {
        let (first_success, _) = watch::channel(false);
        Arc::new(Self {
            launcher,
            first_success,
            spawned: AtomicBool::new(false),
            launched: AtomicBool::new(false),
        })
    }

    /// Record a successful build. Only the first call has any effect.
    pub fn notify_success(&self) {
        self.first_success.send_if_modified(|done| {
            if *done {
                false
            } else {
                *done = true;
                true
            }
        });
    }

    /// Wait for the first success signal, then launch once.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let this = Arc::clone(self);
        let mut first_success = self.first_success.subscribe();
        tokio::spawn(async move {
            // Err means the supervisor itself is gone
            let signalled = first_success.wait_for(|done| *done).await.is_ok();
            if !signalled {
                return;
            }
            this.launch_once().await;
        })
    }

    /// Whether the companion launch has been attempted.
    pub fn has_spawned(&self) -> bool {
        self.spawned.load(Ordering::Acquire)
    }

    /// Whether the companion was launched successfully.
    pub fn has_launched(&self) -> bool {
        self.launched.load(Ordering::Acquire)
    }

    async fn launch_once(&self) {
        if self
            .spawned
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let command = self.launcher.describe();
        ui::info(&format!("Starting `{}`", command));
        match self.launcher.launch().await {
            Ok(()) => {
                self.launched.store(true, Ordering::Release);
                tracing::debug!(%command, "companion process started");
            }
            // Non-fatal: the watch loops keep running without the host
            Err(e) => ui::error(&e.to_string()),
        }
    }
}
