//! Check command implementation.
//!
//! Validates the manifest and every composed pipeline, then checks that
//! each entry file exists. Missing page templates are reported as warnings.

use std::sync::Arc;

use kiln_config::resolve_mode;

use crate::builder::ArtifactBuilder;
use crate::commands::Project;
use crate::engine::CommandEngine;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the check command.
///
/// # Errors
///
/// Returns a configuration error if a pipeline does not validate, or a
/// summary error if any entry file is missing.
pub fn execute(project: Project) -> Result<()> {
    let mode = resolve_mode();
    ui::info(&format!(
        "Checking {} artifacts ({})",
        project.manifest.len(),
        mode
    ));

    let engine = Arc::new(CommandEngine::new(
        project.root.clone(),
        project.settings.engine_command.clone(),
        &project.settings.state_dir,
        mode,
    ));
    let builder = ArtifactBuilder::new(
        mode,
        project.root.clone(),
        project.settings.layout.clone(),
        engine,
    );

    let mut missing = 0;
    for spec in &project.manifest {
        let prepared = builder.prepare(spec)?;

        match prepared.ensure_entry() {
            Ok(()) => ui::success(&format!("  {} {}", spec.name, prepared.request.instruction)),
            Err(e) => {
                ui::error(&e.to_string());
                missing += 1;
            }
        }

        if let Some(html) = prepared.request.configuration.html_entry() {
            let template = project.root.join(&html.template);
            if !template.is_file() {
                ui::warning(&format!(
                    "  Template for '{}' not found: {}",
                    spec.name,
                    template.display()
                ));
            }
        }
    }

    if missing > 0 {
        return Err(CliError::Custom(format!("{} entry file(s) missing", missing)));
    }

    ui::success("All checks passed!");
    Ok(())
}
