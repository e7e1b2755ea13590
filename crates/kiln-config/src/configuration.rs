//! The resolved, per-artifact configuration handed to the bundling engine.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::plugin::{CopyAssetsPlugin, HtmlEntryPlugin, OptimizePlugin, Plugin, PluginKind};
use crate::target::ExecutionTarget;

/// Engine logging options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOptions {
    pub show_bundled_files: bool,
}

/// Mode- and target-specific settings for one artifact.
///
/// Built fresh for every artifact and never mutated once handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub target: ExecutionTarget,

    /// Root all entry instructions and aliases resolve from
    pub source_root: PathBuf,

    pub caching_enabled: bool,

    /// Bundle output path, `{out_dir}/{name}.js`
    pub output_path: PathBuf,

    /// Explicit allow-list of module folders; `None` resolves anything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_resolution_scope: Option<Vec<String>>,

    /// Ordered plugin pipeline
    #[serde(default)]
    pub plugin_pipeline: Vec<Plugin>,

    #[serde(default)]
    pub path_aliases: IndexMap<String, PathBuf>,

    pub source_maps_enabled: bool,

    /// Emit everything into one bundle file
    pub single_bundle_mode: bool,

    /// Leave every external dependency to the host instead of bundling it
    pub ignore_external_dependencies: bool,

    pub typescript_compiler: bool,

    #[serde(default)]
    pub log: LogOptions,
}

impl Configuration {
    /// Plugin kinds in pipeline order.
    pub fn plugin_kinds(&self) -> Vec<PluginKind> {
        self.plugin_pipeline.iter().map(Plugin::kind).collect()
    }

    pub fn count_plugins(&self, kind: PluginKind) -> usize {
        self.plugin_pipeline
            .iter()
            .filter(|p| p.kind() == kind)
            .count()
    }

    pub fn position_of(&self, kind: PluginKind) -> Option<usize> {
        self.plugin_pipeline.iter().position(|p| p.kind() == kind)
    }

    pub fn optimization(&self) -> Option<&OptimizePlugin> {
        self.plugin_pipeline.iter().find_map(|p| match p {
            Plugin::Optimize(opt) => Some(opt),
            _ => None,
        })
    }

    pub fn html_entry(&self) -> Option<&HtmlEntryPlugin> {
        self.plugin_pipeline.iter().find_map(|p| match p {
            Plugin::HtmlEntry(html) => Some(html),
            _ => None,
        })
    }

    pub fn copy_assets(&self) -> Option<&CopyAssetsPlugin> {
        self.plugin_pipeline.iter().find_map(|p| match p {
            Plugin::CopyAssets(copy) => Some(copy),
            _ => None,
        })
    }

    /// Check the pipeline ordering rules.
    ///
    /// Environment injection must come first and exactly once, so literal
    /// substitution is visible to every later plugin. Optimization, when
    /// present, must directly follow it and appear at most once.
    pub fn validate_pipeline(&self, artifact: &str) -> Result<()> {
        let invalid = |reason: String| ConfigError::InvalidPipeline {
            artifact: artifact.to_string(),
            reason,
        };

        if self.position_of(PluginKind::Env) != Some(0) {
            return Err(invalid("environment injection must be the first plugin".into()));
        }
        if self.count_plugins(PluginKind::Env) != 1 {
            return Err(invalid("environment injection must appear exactly once".into()));
        }

        match self.count_plugins(PluginKind::Optimize) {
            0 => {}
            1 => {
                if self.position_of(PluginKind::Optimize) != Some(1) {
                    return Err(invalid(
                        "optimization must run directly after environment injection".into(),
                    ));
                }
            }
            n => return Err(invalid(format!("{n} optimization plugins configured"))),
        }

        Ok(())
    }
}
