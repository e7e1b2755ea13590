//! Plan command implementation.
//!
//! Resolves every artifact the way a build would and prints the result as a
//! JSON array on stdout. The engine is never invoked.

use std::sync::Arc;

use async_trait::async_trait;
use kiln_config::{
    ArtifactKind, BuildMode, Configuration, ExecutionTarget, Lifecycle, resolve_mode,
};
use serde::Serialize;

use crate::builder::ArtifactBuilder;
use crate::cli::PlanArgs;
use crate::commands::Project;
use crate::engine::{BundleEngine, BundleOutput, BundleRequest};
use crate::error::{BuildError, Result};

/// One artifact as the engine would receive it.
#[derive(Debug, Serialize)]
pub struct PlannedArtifact {
    pub name: String,
    pub kind: ArtifactKind,
    pub target: ExecutionTarget,
    pub lifecycle: Lifecycle,
    pub instruction: String,
    pub configuration: Configuration,
}

/// Resolve the plan for `mode` without touching the engine.
pub fn resolve_plan(project: &Project, mode: BuildMode) -> Result<Vec<PlannedArtifact>> {
    let builder = ArtifactBuilder::new(
        mode,
        project.root.clone(),
        project.settings.layout.clone(),
        Arc::new(PlanOnly),
    );

    project
        .manifest
        .iter()
        .map(|spec| {
            let prepared = builder.prepare(spec)?;
            Ok(PlannedArtifact {
                name: spec.name.clone(),
                kind: spec.kind,
                target: spec.target,
                lifecycle: prepared.lifecycle,
                instruction: prepared.request.instruction,
                configuration: prepared.request.configuration,
            })
        })
        .collect()
}

/// Execute the plan command.
pub fn execute(project: Project, args: PlanArgs) -> Result<()> {
    let mode = args.mode.map(BuildMode::from).unwrap_or_else(resolve_mode);
    let plan = resolve_plan(&project, mode)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Planning never bundles.
struct PlanOnly;

#[async_trait]
impl BundleEngine for PlanOnly {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput, BuildError> {
        Err(BuildError::Request {
            artifact: request.name.clone(),
            message: "planning does not run the engine".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{KilnSettings, Manifest, PluginKind};

    fn project() -> Project {
        Project {
            root: std::env::temp_dir(),
            settings: KilnSettings::default(),
            manifest: Manifest::standard().unwrap(),
        }
    }

    #[test]
    fn test_plan_follows_manifest_order() {
        let plan = resolve_plan(&project(), BuildMode::Production).unwrap();
        let names: Vec<_> = plan.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"newtab"));
        assert_eq!(names.last(), Some(&"main"));
        assert!(plan.iter().all(|p| p.lifecycle == Lifecycle::RunOnce));
    }

    #[test]
    fn test_development_plan_has_no_optimizer() {
        let plan = resolve_plan(&project(), BuildMode::Development).unwrap();
        for planned in &plan {
            assert_eq!(planned.configuration.count_plugins(PluginKind::Optimize), 0);
            assert!(planned.lifecycle.is_watching());
        }
    }
}
