//! Shared state for the development server.
//!
//! Everything a request handler or the reload loop touches lives here and is
//! constructed once at startup. Locks are `parking_lot` and are never held
//! across an await.

use crate::config::NobConfig;
use crate::dev::shell::render_shell;
use crate::dev::watcher::FileChange;
use nob_router::{DiscoveryConfig, RouteTable, discover};
use nob_transform::TransformPipeline;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

/// Messages buffered per live-reload session before new ones are dropped.
pub const SESSION_BUFFER: usize = 100;

/// Message pushed to live-reload sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReloadMessage {
    /// First message of every session
    Connected { version: u64 },
    /// A source file changed; `file` is its serve path
    Reload { version: u64, file: String },
}

impl ReloadMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Monotonic reload version.
///
/// A new version is the current wall-clock millisecond, or the previous
/// version plus one if the clock has not moved past it.
#[derive(Debug)]
pub struct ReloadClock {
    version: AtomicU64,
}

impl ReloadClock {
    /// Clock starting at the current time.
    pub fn new() -> Self {
        Self::starting_at(now_ms())
    }

    pub fn starting_at(version: u64) -> Self {
        Self {
            version: AtomicU64::new(version),
        }
    }

    pub fn current(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Move to a new version and return it.
    pub fn advance(&self) -> u64 {
        self.advance_at(now_ms())
    }

    /// Move to a new version given the current time `now` in milliseconds.
    pub fn advance_at(&self, now: u64) -> u64 {
        let next = |prev: u64| now.max(prev.saturating_add(1));
        match self
            .version
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |prev| Some(next(prev)))
        {
            Ok(prev) | Err(prev) => next(prev),
        }
    }
}

impl Default for ReloadClock {
    fn default() -> Self {
        Self::new()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Connected live-reload sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<usize, mpsc::Sender<String>>>,
    next_id: AtomicUsize,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session.
    ///
    /// # Returns
    ///
    /// Session ID and receiver for its messages
    pub fn register(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.sessions.write().insert(id, tx);
        (id, rx)
    }

    /// Remove a session. Returns whether it was still registered.
    pub fn unregister(&self, id: usize) -> bool {
        self.sessions.write().remove(&id).is_some()
    }

    /// Send `message` to every session without waiting.
    ///
    /// Closed sessions are pruned. A session whose buffer is full misses this
    /// message; it is not retried.
    ///
    /// # Returns
    ///
    /// Number of sessions the message was queued for
    pub fn broadcast(&self, message: &str) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in self.sessions.read().iter() {
            match tx.try_send(message.to_string()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(session = id, "live-reload session is not keeping up, message dropped");
                }
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        if !closed.is_empty() {
            let mut sessions = self.sessions.write();
            for id in closed {
                sessions.remove(&id);
                debug!(session = id, "pruned closed live-reload session");
            }
        }

        delivered
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

/// Shared development server state.
pub struct DevServerState {
    root: PathBuf,
    public_dir: PathBuf,
    public_prefix: String,
    module_prefixes: Vec<String>,
    discovery: DiscoveryConfig,
    shell: String,
    routes: RwLock<Arc<RouteTable>>,

    /// On-demand module transforms
    pub pipeline: TransformPipeline,
    /// Live-reload sessions
    pub sessions: SessionRegistry,
    /// Current reload version
    pub clock: ReloadClock,
}

impl DevServerState {
    /// State for `config`, with oxc lowering and an initial route scan.
    pub fn new(config: &NobConfig) -> Self {
        let pipeline = TransformPipeline::new(config.alias_config(), &config.jsx_import_source);
        Self::with_pipeline(config, pipeline)
    }

    /// State using a prepared transform pipeline.
    pub fn with_pipeline(config: &NobConfig, pipeline: TransformPipeline) -> Self {
        let discovery = config.discovery();
        let routes = discover(&discovery);
        info!(routes = routes.len(), app_dir = %discovery.app_dir.display(), "routes discovered");

        Self {
            root: config.root.clone(),
            public_dir: config.public_path(),
            public_prefix: config.public_prefix(),
            module_prefixes: config.module_prefixes(),
            discovery,
            shell: render_shell(config),
            routes: RwLock::new(Arc::new(routes)),
            pipeline,
            sessions: SessionRegistry::new(),
            clock: ReloadClock::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    /// URL prefix of the public directory, e.g. `/public/`.
    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    /// Whether an extensionless request path falls under a module root.
    pub fn is_module_root(&self, path: &str) -> bool {
        self.module_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// The HTML shell served for page requests.
    pub fn shell(&self) -> &str {
        &self.shell
    }

    /// Current route table.
    pub fn routes(&self) -> Arc<RouteTable> {
        Arc::clone(&self.routes.read())
    }

    /// Walk the app directory again on the blocking pool and swap in the new
    /// table. The current table stays in place if the walk panics.
    pub async fn rescan_routes(&self) -> usize {
        let discovery = self.discovery.clone();
        match tokio::task::spawn_blocking(move || discover(&discovery)).await {
            Ok(table) => {
                let count = table.len();
                *self.routes.write() = Arc::new(table);
                info!(routes = count, "routes rescanned");
                count
            }
            Err(e) => {
                warn!(error = %e, "route rescan failed, keeping previous table");
                self.routes().len()
            }
        }
    }

    /// File under the root for a request path.
    ///
    /// Returns `None` for paths with `..` segments.
    pub fn local_path(&self, request_path: &str) -> Option<PathBuf> {
        if request_path.split(['/', '\\']).any(|segment| segment == "..") {
            return None;
        }
        Some(self.root.join(request_path.trim_start_matches('/')))
    }

    /// Request path for a file under the root, e.g. `/app/page.tsx`.
    pub fn serve_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let mut out = String::new();
        for component in relative.components() {
            if let Component::Normal(part) = component {
                out.push('/');
                out.push_str(&part.to_string_lossy());
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Evict whatever `change` invalidates and rescan routes if it touched the
    /// app directory. Returns the serve path of the changed file.
    pub async fn apply_change(&self, change: &FileChange) -> String {
        let path = change.path();

        let evicted = if change.is_removal() || path.is_dir() {
            self.pipeline.invalidate_prefix(path)
        } else {
            usize::from(self.pipeline.invalidate(path))
        };
        debug!(path = %path.display(), evicted, "cache evicted");

        if path.starts_with(&self.discovery.app_dir) {
            self.rescan_routes().await;
        }

        self.serve_path(path)
    }

    /// Advance the reload version and tell every session about `file`.
    pub fn dispatch_reload(&self, file: &str) -> u64 {
        let version = self.clock.advance();
        let message = ReloadMessage::Reload {
            version,
            file: file.to_string(),
        };
        let delivered = self.sessions.broadcast(&message.to_json());
        info!(version, file, sessions = delivered, "reload broadcast");
        version
    }

    /// The greeting for a new session.
    pub fn connected_message(&self) -> ReloadMessage {
        ReloadMessage::Connected {
            version: self.clock.current(),
        }
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
