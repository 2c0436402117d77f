//! File system watcher for development mode.
//!
//! Watches the module roots and the public directory, filtering out
//! node_modules, editor droppings and other configured patterns. Coalescing
//! bursts of changes is left to the reload loop.

use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed or renamed away
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    pub fn is_removal(&self) -> bool {
        matches!(self, FileChange::Removed(_))
    }

    fn from_event(kind: &EventKind, path: &Path) -> Option<Self> {
        let path = path.to_path_buf();
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            // Renames report the old name as a modify; it no longer exists.
            EventKind::Modify(_) if !path.exists() => Some(FileChange::Removed(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Recursive watcher over one or more roots.
///
/// Change events arrive on the receiver returned by [`FileWatcher::new`].
/// Dropping the watcher stops the events.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher.
    ///
    /// # Arguments
    ///
    /// * `roots` - Directories to watch recursively
    /// * `ignore_patterns` - Directory names or `*suffix` patterns to skip
    ///
    /// # Errors
    ///
    /// Returns error if a root doesn't exist or the OS watcher can't be created
    pub fn new(
        roots: Vec<PathBuf>,
        ignore_patterns: Vec<String>,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if let Some(missing) = roots.iter().find(|root| !root.exists()) {
            return Err(CliError::FileNotFound(missing.clone()));
        }

        let (tx, rx) = mpsc::channel(100);
        let filter_roots = roots.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!("file watcher error: {}", err);
                    return;
                }
            };

            for path in &event.paths {
                if Self::should_ignore(path, &filter_roots, &ignore_patterns) {
                    continue;
                }
                let Some(change) = FileChange::from_event(&event.kind, path) else {
                    continue;
                };
                debug!(?change, "file change");
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        for root in &roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
        }

        Ok((
            Self {
                _watcher: watcher,
                roots,
            },
            rx,
        ))
    }

    /// Check if a path should be ignored.
    ///
    /// Paths outside every root, paths matching a pattern and hidden files or
    /// directories are ignored.
    pub fn should_ignore(path: &Path, roots: &[PathBuf], ignore_patterns: &[String]) -> bool {
        let Some(rel_path) = roots.iter().find_map(|root| path.strip_prefix(root).ok()) else {
            return true;
        };

        let path_str = rel_path.to_string_lossy();

        for pattern in ignore_patterns {
            if let Some(suffix) = pattern.strip_prefix('*') {
                if path_str.ends_with(suffix) {
                    return true;
                }
            } else if rel_path
                .components()
                .any(|component| component.as_os_str() == pattern.as_str())
            {
                return true;
            }
        }

        rel_path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
        })
    }

    /// Directories being watched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}
