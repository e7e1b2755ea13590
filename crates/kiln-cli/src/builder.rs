//! Turns one artifact spec into a running build.
//!
//! The builder resolves the artifact's configuration (base config, then the
//! plugin pipeline), checks its entry file and hands it to the engine. What
//! happens next depends on the lifecycle: production builds are awaited,
//! development builds become a [`DevSession`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use kiln_config::{
    ArtifactSpec, BuildMode, ConfigFactory, ExecutionTarget, Layout, Lifecycle, PluginComposer,
};

use crate::dev::{DevContext, DevSession};
use crate::engine::{BundleEngine, BundleOutput, BundleRequest, SharedEngine};
use crate::error::{BuildError, CliError, Result};

/// An artifact with its configuration resolved, ready to hand to the engine.
#[derive(Debug, Clone)]
pub struct PreparedArtifact {
    pub spec: ArtifactSpec,
    pub request: BundleRequest,
    pub lifecycle: Lifecycle,
    /// Absolute path of the entry file
    pub entry_path: PathBuf,
    /// Directories whose changes trigger a rebuild
    pub watch_roots: Vec<PathBuf>,
}

impl PreparedArtifact {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The entry must resolve to an existing file before the engine runs.
    pub fn ensure_entry(&self) -> Result<(), BuildError> {
        if self.entry_path.is_file() {
            Ok(())
        } else {
            Err(BuildError::EntryNotFound {
                artifact: self.spec.name.clone(),
                path: self.entry_path.clone(),
            })
        }
    }

    /// One engine run: entry check, then the engine call.
    pub async fn bundle(&self, engine: &dyn BundleEngine) -> Result<BundleOutput, BuildError> {
        self.ensure_entry()?;
        engine.bundle(&self.request).await
    }
}

/// Result of a one-shot build.
#[derive(Debug, Clone)]
pub struct CompletedBuild {
    pub artifact: String,
    pub target: ExecutionTarget,
    pub output: BundleOutput,
    pub duration: Duration,
}

/// What [`ArtifactBuilder::build`] hands back.
pub enum BuildHandle {
    /// Production: the build already finished
    Completed(CompletedBuild),
    /// Development: a watch session is running
    Watching(DevSession),
}

impl BuildHandle {
    pub fn artifact(&self) -> &str {
        match self {
            BuildHandle::Completed(build) => &build.artifact,
            BuildHandle::Watching(session) => session.artifact(),
        }
    }
}

#[derive(Clone)]
pub struct ArtifactBuilder {
    mode: BuildMode,
    root: PathBuf,
    layout: Layout,
    factory: ConfigFactory,
    composer: PluginComposer,
    engine: SharedEngine,
    dev: Option<DevContext>,
}

impl ArtifactBuilder {
    pub fn new(mode: BuildMode, root: impl Into<PathBuf>, layout: Layout, engine: SharedEngine) -> Self {
        Self {
            mode,
            root: root.into(),
            factory: ConfigFactory::new(mode, layout.clone()),
            composer: PluginComposer::new(mode, layout.clone()),
            layout,
            engine,
            dev: None,
        }
    }

    /// Attach the shared dev server state and change feed that sessions use.
    pub fn with_dev_context(mut self, context: DevContext) -> Self {
        self.dev = Some(context);
        self
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Resolve configuration and lifecycle without invoking the engine.
    pub fn prepare(&self, spec: &ArtifactSpec) -> Result<PreparedArtifact> {
        let base = self.factory.base_config(spec.target, &spec.name);
        let configuration = self.composer.compose(&base, spec)?;

        let source_root = self.root.join(&configuration.source_root);
        let entry_path = spec.entry.resolve(&source_root);

        let mut watch_roots = vec![source_root];
        if spec.kind.is_page() {
            watch_roots.push(self.root.join(&self.layout.template_dir));
        }

        Ok(PreparedArtifact {
            spec: spec.clone(),
            request: BundleRequest::new(spec, configuration),
            lifecycle: Lifecycle::select(spec.kind, self.mode),
            entry_path,
            watch_roots,
        })
    }

    /// Build `spec` according to its lifecycle.
    ///
    /// Production awaits the engine and fails on any build error.
    /// Development returns as soon as the session is running; its failures
    /// are reported by the session itself.
    pub async fn build(&self, spec: &ArtifactSpec) -> Result<BuildHandle> {
        let prepared = self.prepare(spec)?;
        tracing::debug!(
            artifact = %prepared.name(),
            instruction = %prepared.request.instruction,
            lifecycle = %prepared.lifecycle,
            "registering artifact"
        );

        if !prepared.lifecycle.is_watching() {
            let started = Instant::now();
            let output = prepared.bundle(self.engine.as_ref()).await?;
            return Ok(BuildHandle::Completed(CompletedBuild {
                artifact: spec.name.clone(),
                target: spec.target,
                output,
                duration: started.elapsed(),
            }));
        }

        let context = self.dev.clone().ok_or_else(|| {
            CliError::InvalidArgument(format!(
                "'{}' is watched in development mode, which needs the dev server",
                spec.name
            ))
        })?;

        Ok(BuildHandle::Watching(DevSession::start(
            prepared,
            self.engine.clone(),
            context,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kiln_config::{Manifest, PluginKind};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct NoopEngine;

    #[async_trait]
    impl BundleEngine for NoopEngine {
        async fn bundle(&self, _request: &BundleRequest) -> Result<BundleOutput, BuildError> {
            Ok(BundleOutput::default())
        }
    }

    fn builder(mode: BuildMode, root: &std::path::Path) -> ArtifactBuilder {
        ArtifactBuilder::new(mode, root, Layout::default(), Arc::new(NoopEngine))
    }

    #[test]
    fn test_prepare_resolves_entry_and_lifecycle() {
        let temp = TempDir::new().unwrap();
        let manifest = Manifest::standard().unwrap();
        let prepared = builder(BuildMode::Development, temp.path())
            .prepare(manifest.get("app").unwrap())
            .unwrap();

        assert_eq!(prepared.entry_path, temp.path().join("src/renderer/app/index.tsx"));
        assert_eq!(prepared.lifecycle, Lifecycle::WatchHmrSupervised);
        assert_eq!(prepared.request.instruction, "> [renderer/app/index.tsx]");
        assert_eq!(prepared.watch_roots.len(), 2);
        assert_eq!(prepared.request.configuration.count_plugins(PluginKind::Optimize), 0);
    }

    #[tokio::test]
    async fn test_missing_entry_fails_before_engine() {
        let temp = TempDir::new().unwrap();
        let manifest = Manifest::standard().unwrap();
        let result = builder(BuildMode::Production, temp.path())
            .build(manifest.get("main").unwrap())
            .await;

        match result {
            Err(CliError::Build(BuildError::EntryNotFound { artifact, .. })) => {
                assert_eq!(artifact, "main")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("build should fail"),
        }
    }

    #[tokio::test]
    async fn test_development_requires_dev_context() {
        let temp = TempDir::new().unwrap();
        let manifest = Manifest::standard().unwrap();
        let result = builder(BuildMode::Development, temp.path())
            .build(manifest.get("main").unwrap())
            .await;
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
