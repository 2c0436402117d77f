//! Modification-time cache in front of the lowering step.
//!
//! # Architecture
//!
//! - **Lazy validation**: an entry is valid iff its stored mtime equals the
//!   file's current mtime, checked on every request
//! - **Request coalescing**: concurrent misses for one path share a fill
//!   lock, so the file is lowered once and the other callers read the entry
//! - **No eviction policy**: entries leave only through `invalidate*` or
//!   `clear`
//! - **Errors are not cached**

use crate::alias::AliasConfig;
use crate::error::{Result, TransformError};
use crate::lower::{self, Lower, OxcLowering};
use crate::wrapper;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::{debug, error};

#[derive(Debug, Clone)]
struct CacheEntry {
    mtime: SystemTime,
    code: Arc<str>,
}

/// On-demand transform pipeline shared by all request handlers.
pub struct TransformPipeline {
    cache: DashMap<PathBuf, CacheEntry>,
    fill_locks: DashMap<PathBuf, Arc<Mutex<()>>>,
    lowering: Arc<dyn Lower>,
    aliases: AliasConfig,
}

impl TransformPipeline {
    /// Pipeline using oxc lowering with the given JSX import source.
    pub fn new(aliases: AliasConfig, jsx_import_source: &str) -> Self {
        Self::with_lowering(aliases, Arc::new(OxcLowering::new(jsx_import_source)))
    }

    /// Pipeline with a custom lowering step.
    pub fn with_lowering(aliases: AliasConfig, lowering: Arc<dyn Lower>) -> Self {
        Self {
            cache: DashMap::new(),
            fill_locks: DashMap::new(),
            lowering,
            aliases,
        }
    }

    pub fn aliases(&self) -> &AliasConfig {
        &self.aliases
    }

    /// Servable code for the source file at `path`.
    ///
    /// # Errors
    ///
    /// - [`TransformError::NotFound`] if the file does not exist
    /// - [`TransformError::UnsupportedExtension`] for non-script files
    /// - parse/lowering failures from the lowering step
    pub async fn transform(&self, path: &Path) -> Result<Arc<str>> {
        let mtime = modified(path).await?;
        if let Some(code) = self.lookup(path, mtime) {
            debug!(path = %path.display(), "transform cache hit");
            return Ok(code);
        }

        let lock = Arc::clone(self.fill_locks.entry(path.to_path_buf()).or_default().value());
        let _fill = lock.lock().await;

        // Another caller may have filled the entry while we waited
        let mtime = modified(path).await?;
        if let Some(code) = self.lookup(path, mtime) {
            debug!(path = %path.display(), "transform coalesced");
            return Ok(code);
        }

        debug!(path = %path.display(), "transform cache miss");
        match self.compute(path).await {
            Ok(code) => {
                self.cache.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        mtime,
                        code: Arc::clone(&code),
                    },
                );
                Ok(code)
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "transform failed");
                Err(err)
            }
        }
    }

    async fn compute(&self, path: &Path) -> Result<Arc<str>> {
        lower::source_type(path)?;

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TransformError::from_io(path, e))?;

        let lowering = Arc::clone(&self.lowering);
        let owned = path.to_path_buf();
        let lowered = tokio::task::spawn_blocking(move || lowering.lower(&owned, &source)).await??;

        let mut code = self.aliases.rewrite(&lowered);
        if wrapper::is_wrapper(path) {
            code = wrapper::rewrite(&code);
        }
        Ok(Arc::from(code))
    }

    fn lookup(&self, path: &Path, mtime: SystemTime) -> Option<Arc<str>> {
        self.cache
            .get(path)
            .filter(|entry| entry.mtime == mtime)
            .map(|entry| Arc::clone(&entry.code))
    }

    /// Drop the entry for one file. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.fill_locks.remove(path);
        self.cache.remove(path).is_some()
    }

    /// Drop every entry at or below `dir`. Returns how many were removed.
    pub fn invalidate_prefix(&self, dir: &Path) -> usize {
        let before = self.cache.len();
        self.cache.retain(|key, _| !key.starts_with(dir));
        self.fill_locks.retain(|key, _| !key.starts_with(dir));
        before.saturating_sub(self.cache.len())
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.cache.clear();
        self.fill_locks.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Whether a (possibly stale) entry exists for `path`.
    pub fn contains(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }
}

impl std::fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("entries", &self.cache.len())
            .field("aliases", &self.aliases)
            .finish()
    }
}

async fn modified(path: &Path) -> Result<SystemTime> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| TransformError::from_io(path, e))?;
    if !metadata.is_file() {
        return Err(TransformError::NotFound {
            path: path.to_path_buf(),
        });
    }
    metadata
        .modified()
        .map_err(|e| TransformError::from_io(path, e))
}
