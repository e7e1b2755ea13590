//! Build command implementation.

use kiln_config::resolve_mode;

use crate::cli::BuildArgs;
use crate::commands::Project;
use crate::error::Result;
use crate::orchestrator::Orchestrator;

/// Execute the build command.
///
/// The mode comes from `NODE_ENV`. Production returns once every artifact
/// has been built; development serves and watches until Ctrl+C.
pub async fn execute(project: Project, args: BuildArgs) -> Result<()> {
    let Project {
        root,
        mut settings,
        manifest: _,
    } = project;

    if let Some(port) = args.port {
        settings.dev.port = port;
    }
    if let Some(engine) = args.engine {
        settings.engine_command = engine;
    }

    let mode = resolve_mode();
    tracing::debug!(%mode, engine = %settings.engine_command, "starting build");

    Orchestrator::from_settings(mode, root, settings)?.run().await
}
