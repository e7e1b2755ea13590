use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Plugin kinds understood by the bundling engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PluginKind {
    Env,
    Optimize,
    HtmlEntry,
    Json,
    CopyAssets,
    StyledComponents,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PluginKind::Env => "env",
            PluginKind::Optimize => "optimize",
            PluginKind::HtmlEntry => "html-entry",
            PluginKind::Json => "json",
            PluginKind::CopyAssets => "copy-assets",
            PluginKind::StyledComponents => "styled-components",
        })
    }
}

/// One entry in an artifact's plugin pipeline.
///
/// A plugin that does not apply is simply not in the pipeline; there is no
/// placeholder variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Plugin {
    Env(EnvPlugin),
    Optimize(OptimizePlugin),
    HtmlEntry(HtmlEntryPlugin),
    Json,
    CopyAssets(CopyAssetsPlugin),
    StyledComponents,
}

impl Plugin {
    pub fn kind(&self) -> PluginKind {
        match self {
            Plugin::Env(_) => PluginKind::Env,
            Plugin::Optimize(_) => PluginKind::Optimize,
            Plugin::HtmlEntry(_) => PluginKind::HtmlEntry,
            Plugin::Json => PluginKind::Json,
            Plugin::CopyAssets(_) => PluginKind::CopyAssets,
            Plugin::StyledComponents => PluginKind::StyledComponents,
        }
    }
}

/// Literal environment values substituted into bundled code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvPlugin {
    pub vars: IndexMap<String, String>,
}

/// Production optimization: tree shaking and minification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizePlugin {
    /// Bundle whose runtime API is baked in (the artifact itself)
    pub bake_api_into_bundle: String,
    pub treeshake: bool,
    /// Rewrite import/export interop helpers; kept off so modules stay as authored
    pub remove_exports_interop: bool,
    pub minify: MinifyOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinifyOptions {
    pub enabled: bool,
    pub dialect: String,
}

/// HTML page generation from a per-artifact template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlEntryPlugin {
    pub template: PathBuf,
    /// Public path bundles are referenced from
    pub public_path: String,
    /// Output file name, `{name}.html`
    pub filename: String,
    pub bundles: Vec<String>,
}

/// Static asset copying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyAssetsPlugin {
    /// Glob patterns of files to copy
    pub files: Vec<String>,
    /// Destination directory inside the output directory
    pub dest: String,
    /// Path the copied assets are resolved from at runtime
    pub resolve: String,
}
