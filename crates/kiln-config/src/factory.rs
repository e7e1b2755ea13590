//! Base configuration per execution target.

use indexmap::IndexMap;

use crate::configuration::{Configuration, LogOptions};
use crate::mode::BuildMode;
use crate::settings::Layout;
use crate::target::ExecutionTarget;

/// Alias resolving to the source root in every bundle.
pub const SOURCE_ALIAS: &str = "~";

/// Module folders a browser page may resolve. Everything else is external.
pub const BROWSER_RESOLUTION_SCOPE: &[&str] = &[
    "node_modules/react",
    "node_modules/react-dom",
    "node_modules/react-style-tag",
    "node_modules/react-cookies",
    "node_modules/electron",
    "node_modules/fs",
];

/// Produces the plugin-free starting configuration for an artifact.
#[derive(Debug, Clone)]
pub struct ConfigFactory {
    mode: BuildMode,
    layout: Layout,
}

impl ConfigFactory {
    pub fn new(mode: BuildMode, layout: Layout) -> Self {
        Self { mode, layout }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Base configuration for `(target, name)` in the factory's mode.
    ///
    /// Pure: the same inputs always produce equal records.
    pub fn base_config(&self, target: ExecutionTarget, name: &str) -> Configuration {
        let dev = self.mode.is_development();
        let source_root = self.layout.source_dir.clone();

        let mut path_aliases = IndexMap::new();
        path_aliases.insert(SOURCE_ALIAS.to_string(), source_root.clone());

        let mut config = Configuration {
            target,
            source_root,
            caching_enabled: dev,
            output_path: self.layout.out_dir.join(format!("{name}.js")),
            module_resolution_scope: None,
            plugin_pipeline: Vec::new(),
            path_aliases,
            source_maps_enabled: false,
            single_bundle_mode: false,
            ignore_external_dependencies: false,
            typescript_compiler: true,
            log: LogOptions::default(),
        };

        match target {
            ExecutionTarget::Server => {}
            ExecutionTarget::DesktopRenderer => {
                config.source_maps_enabled = dev;
            }
            ExecutionTarget::Browser => {
                config.module_resolution_scope = Some(
                    BROWSER_RESOLUTION_SCOPE
                        .iter()
                        .map(|s| (*s).to_string())
                        .collect(),
                );
                config.single_bundle_mode = true;
                config.ignore_external_dependencies = true;
                config.source_maps_enabled = dev;
                config.log.show_bundled_files = true;
            }
        }

        config
    }
}
