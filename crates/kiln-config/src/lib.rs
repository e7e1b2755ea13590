//! Build configuration for the kiln orchestrator.
//!
//! Everything here is pure data and pure functions: the fixed artifact
//! manifest, the build mode, the per-target base configuration, the plugin
//! pipeline and the lifecycle policy table. Nothing in this crate talks to the
//! bundling engine or spawns processes; that lives in `kiln-cli`.

pub mod artifact;
pub mod composer;
pub mod configuration;
pub mod error;
pub mod factory;
pub mod lifecycle;
pub mod manifest;
pub mod mode;
pub mod plugin;
pub mod settings;
pub mod target;

// Re-export main types
pub use artifact::{ArtifactKind, ArtifactSpec, EntryInstruction};
pub use composer::PluginComposer;
pub use configuration::{Configuration, LogOptions};
pub use error::{ConfigError, Result};
pub use factory::{BROWSER_RESOLUTION_SCOPE, ConfigFactory, SOURCE_ALIAS};
pub use lifecycle::{HmrReload, Lifecycle};
pub use manifest::{Declaration, Manifest, STANDARD_DECLARATIONS};
pub use mode::{BuildMode, MODE_ENV_VAR, resolve_mode};
pub use plugin::{
    CopyAssetsPlugin, EnvPlugin, HtmlEntryPlugin, MinifyOptions, OptimizePlugin, Plugin,
    PluginKind,
};
pub use settings::{CompanionSettings, DevSettings, KilnSettings, Layout, CONFIG_FILE_NAME};
pub use target::ExecutionTarget;
