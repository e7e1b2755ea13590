//! Orchestrator settings.
//!
//! Loaded from multiple sources. Priority: environment (`KILN_*`) > config
//! file (`kiln.config.json`) > defaults. The CLI layers its own flags on top.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default config file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "kiln.config.json";

/// Project directory layout, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Directory holding `{name}.html` page templates
    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            out_dir: default_out_dir(),
            template_dir: default_template_dir(),
        }
    }
}

/// Companion process launched next to the app shell in development.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionSettings {
    #[serde(default = "default_companion_program")]
    pub program: String,

    #[serde(default = "default_companion_args")]
    pub args: Vec<String>,
}

impl CompanionSettings {
    /// Shell command line, e.g. `npm start`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            program: default_companion_program(),
            args: default_companion_args(),
        }
    }
}

/// Development server and watcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Watch ignore patterns: directory names or `*.ext` suffixes
    #[serde(default = "default_watch_ignore")]
    pub watch_ignore: Vec<String>,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debounce_ms: default_debounce_ms(),
            watch_ignore: default_watch_ignore(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KilnSettings {
    #[serde(default)]
    pub layout: Layout,

    /// Shell command that runs the bundling engine for one request
    #[serde(default = "default_engine_command")]
    pub engine_command: String,

    /// Working state (engine requests), relative to the project root
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    #[serde(default)]
    pub companion: CompanionSettings,

    #[serde(default)]
    pub dev: DevSettings,
}

impl Default for KilnSettings {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            engine_command: default_engine_command(),
            state_dir: default_state_dir(),
            companion: CompanionSettings::default(),
            dev: DevSettings::default(),
        }
    }
}

impl KilnSettings {
    /// Load settings for a project.
    ///
    /// An explicit `config_file` must exist; otherwise `kiln.config.json`
    /// in `root` is used when present.
    pub fn load(root: &Path, config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let file = match config_file {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                if !path.is_file() {
                    return Err(ConfigError::Load {
                        path,
                        message: "config file does not exist".to_string(),
                    });
                }
                Some(path)
            }
            None => {
                let default_path = root.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = &file {
            tracing::debug!(path = %path.display(), "loading settings file");
            figment = figment.merge(Json::file(path));
        }

        // KILN_ENGINE_COMMAND, KILN_DEV__PORT, ...
        figment = figment.merge(Env::prefixed("KILN_").split("__"));

        figment.extract().map_err(|e| ConfigError::Load {
            path: file.unwrap_or_else(|| root.join(CONFIG_FILE_NAME)),
            message: e.to_string(),
        })
    }
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("static/pages")
}

fn default_companion_program() -> String {
    "npm".to_string()
}

fn default_companion_args() -> Vec<String> {
    vec!["start".to_string()]
}

fn default_engine_command() -> String {
    "node scripts/bundle.js".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".kiln")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4444
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_watch_ignore() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "build".to_string(),
        ".kiln".to_string(),
        "*.log".to_string(),
    ]
}
