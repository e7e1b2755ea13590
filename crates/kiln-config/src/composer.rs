//! Plugin pipeline composition.
//!
//! Which plugins run is decided by the build mode and the artifact kind
//! alone. Plugins that do not apply are left out of the pipeline entirely.

use indexmap::IndexMap;

use crate::artifact::ArtifactSpec;
use crate::configuration::Configuration;
use crate::error::Result;
use crate::mode::{BuildMode, MODE_ENV_VAR};
use crate::plugin::{
    CopyAssetsPlugin, EnvPlugin, HtmlEntryPlugin, MinifyOptions, OptimizePlugin, Plugin,
};
use crate::settings::Layout;

/// Static asset patterns copied next to every page.
const PAGE_ASSET_PATTERNS: &[&str] = &["*.woff2", "*.png", "*.svg"];

const ASSET_DIR: &str = "assets";

#[derive(Debug, Clone)]
pub struct PluginComposer {
    mode: BuildMode,
    layout: Layout,
}

impl PluginComposer {
    pub fn new(mode: BuildMode, layout: Layout) -> Self {
        Self { mode, layout }
    }

    /// Compose the plugin pipeline onto `base`, returning a new configuration.
    ///
    /// Any plugins already on `base` are replaced. The result is validated
    /// before it is returned.
    pub fn compose(&self, base: &Configuration, spec: &ArtifactSpec) -> Result<Configuration> {
        let mut pipeline = Vec::with_capacity(6);
        pipeline.push(Plugin::Env(self.env_plugin()));

        if self.mode.is_production() {
            pipeline.push(Plugin::Optimize(OptimizePlugin {
                bake_api_into_bundle: spec.name.clone(),
                treeshake: true,
                remove_exports_interop: false,
                minify: MinifyOptions {
                    enabled: true,
                    dialect: spec.target.dialect().to_string(),
                },
            }));
        }

        if spec.kind.is_page() {
            pipeline.extend(self.page_plugins(spec));
        }

        let config = Configuration {
            plugin_pipeline: pipeline,
            ..base.clone()
        };
        config.validate_pipeline(&spec.name)?;

        tracing::trace!(
            artifact = %spec.name,
            plugins = ?config.plugin_kinds(),
            "composed plugin pipeline"
        );
        Ok(config)
    }

    fn env_plugin(&self) -> EnvPlugin {
        let mut vars = IndexMap::new();
        vars.insert(MODE_ENV_VAR.to_string(), self.mode.as_str().to_string());
        EnvPlugin { vars }
    }

    fn page_plugins(&self, spec: &ArtifactSpec) -> [Plugin; 4] {
        let (public_path, asset_root) = match self.mode {
            BuildMode::Production => (".", "./assets"),
            BuildMode::Development => ("/", "/assets"),
        };

        [
            Plugin::HtmlEntry(HtmlEntryPlugin {
                template: self.layout.template_dir.join(format!("{}.html", spec.name)),
                public_path: public_path.to_string(),
                filename: format!("{}.html", spec.name),
                bundles: vec![spec.name.clone()],
            }),
            Plugin::Json,
            Plugin::CopyAssets(CopyAssetsPlugin {
                files: PAGE_ASSET_PATTERNS.iter().map(|p| (*p).to_string()).collect(),
                dest: ASSET_DIR.to_string(),
                resolve: asset_root.to_string(),
            }),
            Plugin::StyledComponents,
        ]
    }
}
