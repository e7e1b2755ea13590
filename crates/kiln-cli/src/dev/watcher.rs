//! Project file watcher.
//!
//! Watches the whole project recursively and fans relevant changes out to
//! every dev session over a broadcast channel. Debouncing is left to the
//! subscribers, which each collapse a burst of changes into one rebuild.

use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
    changes: broadcast::Sender<FileChange>,
}

impl FileWatcher {
    /// Start watching `root`.
    ///
    /// `ignore_patterns` are directory names (matched against any path
    /// component) or `*.ext` suffixes. Hidden files and directories are
    /// always ignored.
    pub fn new(root: PathBuf, ignore_patterns: Vec<String>) -> Result<Self> {
        if !root.is_dir() {
            return Err(CliError::InvalidArgument(format!(
                "cannot watch {}: not a directory",
                root.display()
            )));
        }

        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        let tx = changes.clone();
        let root_clone = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, "file watcher error");
                    return;
                }
            };

            for path in &event.paths {
                if Self::should_ignore(path, &root_clone, &ignore_patterns) {
                    continue;
                }

                let change = match event.kind {
                    EventKind::Create(_) => FileChange::Created(path.clone()),
                    EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                tracing::trace!(?change, "file change");
                // No subscribers yet is fine
                let _ = tx.send(change);
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok(Self {
            _watcher: watcher,
            root,
            changes,
        })
    }

    /// Sender side of the change channel, for sessions to subscribe to.
    pub fn changes(&self) -> broadcast::Sender<FileChange> {
        self.changes.clone()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
        // Only watch files within root
        let rel_path = match path.strip_prefix(root) {
            Ok(p) => p,
            Err(_) => return true,
        };

        let path_str = rel_path.to_string_lossy();
        let components: Vec<_> = rel_path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();

        if components.iter().any(|name| name.starts_with('.')) {
            return true;
        }

        ignore_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                path_str.ends_with(suffix)
            } else {
                // "build" or a nested "out/web"
                let pattern = Path::new(pattern.trim_start_matches("./"));
                rel_path.starts_with(pattern)
                    || components
                        .iter()
                        .any(|name| Path::new(name) == pattern)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Vec<String> {
        ["node_modules", "build", ".kiln", "*.log"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_should_ignore_node_modules() {
        let root = PathBuf::from("/project");

        let path = PathBuf::from("/project/node_modules/react/index.js");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns()));

        let path = PathBuf::from("/project/src/main/index.ts");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns()));
    }

    #[test]
    fn test_should_ignore_output_and_state() {
        let root = PathBuf::from("/project");
        for path in ["/project/build/app.js", "/project/.kiln/requests/app.json"] {
            assert!(FileWatcher::should_ignore(Path::new(path), &root, &patterns()), "{path}");
        }
        // a prefix match on a sibling is not a match
        let path = PathBuf::from("/project/src/buildinfo.ts");
        assert!(!FileWatcher::should_ignore(&path, &root, &patterns()));
    }

    #[test]
    fn test_should_ignore_extension() {
        let root = PathBuf::from("/project");
        let path = PathBuf::from("/project/npm-debug.log");
        assert!(FileWatcher::should_ignore(&path, &root, &patterns()));
    }

    #[test]
    fn test_should_ignore_hidden_files() {
        let root = PathBuf::from("/project");
        for path in ["/project/.git/config", "/project/.env", "/project/src/.cache/x.ts"] {
            assert!(FileWatcher::should_ignore(Path::new(path), &root, &[]), "{path}");
        }
    }

    #[test]
    fn test_should_ignore_outside_root() {
        let root = PathBuf::from("/project");
        let path = PathBuf::from("/other/file.ts");
        assert!(FileWatcher::should_ignore(&path, &root, &[]));
    }

    #[test]
    fn test_file_change_path() {
        let path = PathBuf::from("/project/src/index.ts");
        assert_eq!(FileChange::Modified(path.clone()).path(), path.as_path());
        assert_eq!(FileChange::Removed(path.clone()).path(), path.as_path());
    }

    #[test]
    fn test_rejects_missing_root() {
        let result = FileWatcher::new(PathBuf::from("/definitely/not/here"), vec![]);
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }
}
