//! Build mode resolution.
//!
//! The mode is read from the environment exactly once and then handed to
//! every component explicitly. Anything other than an explicit development
//! marker resolves to production, so an unset or misspelled variable still
//! ships optimized artifacts.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Environment variable that selects the build mode.
pub const MODE_ENV_VAR: &str = "NODE_ENV";

/// Global development/production switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Interpret a raw environment value.
    ///
    /// `development` and the short `dev` marker select development (case
    /// insensitive, surrounding whitespace ignored); everything else,
    /// including absence, selects production.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("development") || v.eq_ignore_ascii_case("dev") => {
                BuildMode::Development
            }
            _ => BuildMode::Production,
        }
    }

    /// Read the mode from the current process environment (uncached).
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODE_ENV_VAR).ok().as_deref())
    }

    pub fn is_development(self) -> bool {
        matches!(self, BuildMode::Development)
    }

    pub fn is_production(self) -> bool {
        matches!(self, BuildMode::Production)
    }

    /// Literal value injected into bundled code as `NODE_ENV`.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static RESOLVED: OnceLock<BuildMode> = OnceLock::new();

/// Resolve the process-wide build mode.
///
/// The first call reads [`MODE_ENV_VAR`]; later calls return the same value
/// even if the environment has changed since.
pub fn resolve_mode() -> BuildMode {
    *RESOLVED.get_or_init(|| {
        let mode = BuildMode::from_env();
        tracing::debug!(%mode, "resolved build mode");
        mode
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn development_markers() {
        assert_eq!(BuildMode::from_env_value(Some("development")), BuildMode::Development);
        assert_eq!(BuildMode::from_env_value(Some("dev")), BuildMode::Development);
        assert_eq!(BuildMode::from_env_value(Some(" Development ")), BuildMode::Development);
    }

    #[test]
    fn everything_else_is_production() {
        assert_eq!(BuildMode::from_env_value(None), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some("")), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some("production")), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some("develop")), BuildMode::Production);
        assert_eq!(BuildMode::from_env_value(Some("test")), BuildMode::Production);
    }

    #[test]
    fn literal_values() {
        assert_eq!(BuildMode::Development.as_str(), "development");
        assert_eq!(BuildMode::Production.to_string(), "production");
    }

    #[test]
    #[serial]
    fn reads_process_environment() {
        unsafe {
            std::env::set_var(MODE_ENV_VAR, "dev");
        }
        assert_eq!(BuildMode::from_env(), BuildMode::Development);

        unsafe {
            std::env::remove_var(MODE_ENV_VAR);
        }
        assert_eq!(BuildMode::from_env(), BuildMode::Production);
    }

    #[test]
    #[serial]
    fn resolve_mode_is_stable() {
        let first = resolve_mode();
        unsafe {
            std::env::set_var(
                MODE_ENV_VAR,
                match first {
                    BuildMode::Development => "production",
                    BuildMode::Production => "development",
                },
            );
        }
        assert_eq!(resolve_mode(), first);
        unsafe {
            std::env::remove_var(MODE_ENV_VAR);
        }
    }
}
