//! Engine backed by an external command.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use kiln_config::{BuildMode, MODE_ENV_VAR};
use tokio::process::Command;

use super::{BundleEngine, BundleOutput, BundleRequest};
use crate::error::BuildError;

/// Path of the JSON request file for the current invocation.
pub const REQUEST_ENV_VAR: &str = "KILN_BUNDLE_REQUEST";

/// Name of the artifact being bundled.
pub const ARTIFACT_ENV_VAR: &str = "KILN_ARTIFACT";

/// Runs a shell command once per bundle request.
///
/// The request is written as pretty JSON to `{state_dir}/requests/{name}.json`
/// and its path passed in [`REQUEST_ENV_VAR`]. The command runs in the
/// project root.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    root: PathBuf,
    command: String,
    state_dir: PathBuf,
    mode: BuildMode,
}

impl CommandEngine {
    pub fn new(
        root: impl Into<PathBuf>,
        command: impl Into<String>,
        state_dir: impl AsRef<Path>,
        mode: BuildMode,
    ) -> Self {
        let root = root.into();
        let state_dir = root.join(state_dir);
        Self {
            root,
            command: command.into(),
            state_dir,
            mode,
        }
    }

    pub fn request_path(&self, artifact: &str) -> PathBuf {
        self.state_dir.join("requests").join(format!("{artifact}.json"))
    }

    async fn write_request(&self, request: &BundleRequest) -> Result<PathBuf, BuildError> {
        let failed = |message: String| BuildError::Request {
            artifact: request.name.clone(),
            message,
        };

        let path = self.request_path(&request.name);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| failed(format!("cannot create {}: {e}", dir.display())))?;
        }

        let json = serde_json::to_vec_pretty(request).map_err(|e| failed(e.to_string()))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| failed(format!("cannot write {}: {e}", path.display())))?;

        Ok(path)
    }

    fn collect_output(&self, request: &BundleRequest) -> Result<BundleOutput, BuildError> {
        let bundle = self.root.join(&request.configuration.output_path);
        if !bundle.is_file() {
            return Err(BuildError::Output {
                artifact: request.name.clone(),
                path: bundle,
            });
        }

        let source_map = PathBuf::from(format!("{}.map", bundle.display()));
        let page = bundle.with_file_name(format!("{}.html", request.name));

        let mut files = vec![bundle];
        files.extend([source_map, page].into_iter().filter(|p| p.is_file()));
        Ok(BundleOutput { files })
    }
}

#[async_trait]
impl BundleEngine for CommandEngine {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BuildError> {
        let request_path = self.write_request(request).await?;
        tracing::debug!(
            artifact = %request.name,
            command = %self.command,
            request = %request_path.display(),
            "invoking bundling engine"
        );

        let output = shell(&self.command)
            .current_dir(&self.root)
            .env(REQUEST_ENV_VAR, &request_path)
            .env(ARTIFACT_ENV_VAR, &request.name)
            .env(MODE_ENV_VAR, self.mode.as_str())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| BuildError::Request {
                artifact: request.name.clone(),
                message: format!("cannot run `{}`: {e}", self.command),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let combined = [stderr.trim_end(), stdout.trim_end()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(BuildError::Engine {
                artifact: request.name.clone(),
                status: output.status.to_string(),
                output: combined,
            });
        }

        self.collect_output(request)
    }
}

/// A command interpreted by the platform shell.
pub(crate) fn shell(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}
