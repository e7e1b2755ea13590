//! Execution targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Runtime environment family an artifact is compiled for.
///
/// Serialized with the engine-facing names (`server`, `electron`,
/// `browser@es6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ExecutionTarget {
    /// Backend process (Node runtime globals, node module resolution)
    Server,
    /// Desktop-host renderer process (electron)
    DesktopRenderer,
    /// Plain browser page
    Browser,
}

impl ExecutionTarget {
    /// Target string understood by the bundling engine.
    pub fn engine_name(self) -> &'static str {
        match self {
            ExecutionTarget::Server => "server",
            ExecutionTarget::DesktopRenderer => "electron",
            ExecutionTarget::Browser => "browser@es6",
        }
    }

    /// Language dialect the minifier must preserve for this target.
    pub fn dialect(self) -> &'static str {
        // Every target is compiled with the TypeScript compiler down to ES6.
        "es6"
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionTarget::Server => "server",
            ExecutionTarget::DesktopRenderer => "desktop-renderer",
            ExecutionTarget::Browser => "browser",
        })
    }
}

impl FromStr for ExecutionTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (family, dialect) = match s.split_once('@') {
            Some((family, dialect)) => (family, Some(dialect)),
            None => (s, None),
        };

        let target = match family {
            "server" => ExecutionTarget::Server,
            "electron" | "desktop-renderer" => ExecutionTarget::DesktopRenderer,
            "browser" => ExecutionTarget::Browser,
            _ => return Err(ConfigError::InvalidTarget(s.to_string())),
        };

        match dialect {
            None => Ok(target),
            Some(d) if d == target.dialect() => Ok(target),
            Some(_) => Err(ConfigError::InvalidTarget(s.to_string())),
        }
    }
}

impl From<ExecutionTarget> for String {
    fn from(target: ExecutionTarget) -> Self {
        target.engine_name().to_string()
    }
}

impl TryFrom<String> for ExecutionTarget {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
