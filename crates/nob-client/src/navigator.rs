//! Client navigator state machine.
//!
//! ```text
//! Uninitialized ──mount──▶ Idle ──resolve──▶ Resolving ─┬─▶ Rendered
//!                                                      ├─▶ NotFound
//!                                                      └─▶ Error
//! ```
//!
//! Every resolution takes a sequence number. A resolution only commits its
//! result if no newer resolution has started and the reload version is
//! unchanged, so a slow load can never overwrite a newer page.

use crate::error::{LoadError, NavigatorError, Result};
use crate::host::NavigatorHost;
use crate::render::{LoadedRoute, RenderNode, compose, compose_error, compose_not_found};
use futures::future::join_all;
use nob_router::{NotFoundBoundary, Params, RouteTable, normalize_path};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use url::Url;

/// Where the navigator currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState<M> {
    /// No route table yet
    Uninitialized,
    /// Route table loaded, nothing resolved yet
    Idle,
    /// Loading modules for `path`
    Resolving { path: String },
    /// `path` matched and every module loaded
    Rendered { path: String, tree: RenderNode<M> },
    /// No route matched `path`; `tree` is `None` when the built-in
    /// placeholder should be shown
    NotFound {
        path: String,
        tree: Option<RenderNode<M>>,
    },
    /// Resolution failed; `boundary` is the route's error module if it loaded
    Error {
        message: String,
        boundary: Option<RenderNode<M>>,
    },
}

impl<M> NavState<M> {
    /// Composed tree for `Rendered` and custom `NotFound` states.
    pub fn tree(&self) -> Option<&RenderNode<M>> {
        match self {
            NavState::Rendered { tree, .. } => Some(tree),
            NavState::NotFound { tree, .. } => tree.as_ref(),
            NavState::Error { boundary, .. } => boundary.as_ref(),
            _ => None,
        }
    }
}

/// Whether a resolution's result was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// A newer resolution or a reload started first; the result was dropped
    Superseded,
}

struct Inner<M> {
    table: Option<Arc<RouteTable>>,
    table_stale: bool,
    version: u64,
    location: String,
    state: NavState<M>,
}

/// Client-side router driving a [`NavigatorHost`].
pub struct Navigator<H: NavigatorHost> {
    host: H,
    sequence: AtomicU64,
    inner: Mutex<Inner<H::Module>>,
}

impl<H: NavigatorHost> Navigator<H> {
    /// Navigator starting at reload version `version`.
    pub fn new(host: H, version: u64) -> Self {
        Self {
            host,
            sequence: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                table: None,
                table_stale: true,
                version,
                location: "/".to_string(),
                state: NavState::Uninitialized,
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> NavState<H::Module> {
        self.inner.lock().state.clone()
    }

    /// Current reload version.
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Normalized path of the current location.
    pub fn location(&self) -> String {
        self.inner.lock().location.clone()
    }

    /// The route table in use, if one has been fetched.
    pub fn table(&self) -> Option<Arc<RouteTable>> {
        self.inner.lock().table.clone()
    }

    /// Fetch the route table, then resolve `location`.
    pub async fn mount(&self, location: &str) -> Result<Resolution> {
        let (sequence, path) = self.begin(location);
        let version = self.version();

        if let Err(err) = self.ensure_table().await {
            self.commit(
                sequence,
                version,
                NavState::Error {
                    message: err.to_string(),
                    boundary: None,
                },
            );
            return Err(err);
        }

        {
            let mut inner = self.inner.lock();
            if matches!(inner.state, NavState::Uninitialized) {
                inner.state = NavState::Idle;
            }
            if self.sequence.load(Ordering::SeqCst) == sequence {
                inner.state = NavState::Resolving { path: path.clone() };
            }
        }
        self.resolve_from(sequence, version, path).await
    }

    /// Push `href` onto history and resolve it.
    pub async fn navigate(&self, href: &str) -> Result<Resolution> {
        self.host.push_history(href);
        self.resolve(href).await
    }

    /// Resolve the location the browser moved to (back/forward).
    pub async fn pop_state(&self, location: &str) -> Result<Resolution> {
        self.resolve(location).await
    }

    /// Record a new reload version and re-resolve the current location with
    /// a freshly fetched route table.
    pub async fn reload(&self, version: u64) -> Result<Resolution> {
        let location = {
            let mut inner = self.inner.lock();
            inner.version = version;
            inner.table_stale = true;
            inner.location.clone()
        };
        debug!(version, location = %location, "reloading");
        self.resolve(&location).await
    }

    /// Whether `url` carries the current version marker.
    pub fn is_current(&self, url: &str) -> bool {
        version_marker(url) == Some(self.version())
    }

    /// `path` tagged with the current version marker.
    pub fn module_url(&self, path: &str) -> String {
        with_version(path, self.version())
    }

    async fn resolve(&self, location: &str) -> Result<Resolution> {
        let (sequence, path) = self.begin(location);
        let version = self.version();
        self.resolve_from(sequence, version, path).await
    }

    fn begin(&self, location: &str) -> (u64, String) {
        let path = normalize_path(location);
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let mut inner = self.inner.lock();
        inner.location = path.clone();
        if !matches!(inner.state, NavState::Uninitialized) {
            inner.state = NavState::Resolving { path: path.clone() };
        }
        (sequence, path)
    }

    async fn resolve_from(
        &self,
        sequence: u64,
        version: u64,
        path: String,
    ) -> Result<Resolution> {
        let table = match self.ensure_table().await {
            Ok(table) => table,
            Err(err) => {
                self.commit(
                    sequence,
                    version,
                    NavState::Error {
                        message: err.to_string(),
                        boundary: None,
                    },
                );
                return Err(err);
            }
        };

        let next = match table.match_path(&path) {
            Some(hit) => {
                debug!(path = %path, pattern = %hit.route.pattern, "route matched");
                let route = hit.route;
                self.load_route(
                    version,
                    &route.page_path,
                    &route.layout_paths,
                    route.loading_path.as_deref(),
                    route.error_path.as_deref(),
                    hit.params,
                    path,
                )
                .await
            }
            None => {
                debug!(path = %path, "no route matched");
                let tree = match table.not_found_for(&path) {
                    Some(boundary) => self.load_not_found(version, boundary).await,
                    None => None,
                };
                NavState::NotFound { path, tree }
            }
        };

        Ok(self.commit(sequence, version, next))
    }

    #[allow(clippy::too_many_arguments)]
    async fn load_route(
        &self,
        version: u64,
        page: &str,
        layouts: &[String],
        loading: Option<&str>,
        error: Option<&str>,
        params: Params,
        path: String,
    ) -> NavState<H::Module> {
        let mut urls: Vec<&str> = Vec::with_capacity(layouts.len() + 3);
        urls.push(page);
        urls.extend(layouts.iter().map(String::as_str));
        urls.extend(loading);
        urls.extend(error);

        let mut modules = match self.load_all(version, &urls).await {
            Ok(modules) => modules.into_iter(),
            Err(err) => {
                warn!(path = %path, error = %err, "failed to load route modules");
                let message = err.to_string();
                let boundary = match error {
                    Some(error_path) => {
                        self.load_error_boundary(
                            version,
                            error_path,
                            layouts,
                            message.clone(),
                            &params,
                        )
                        .await
                    }
                    None => None,
                };
                return NavState::Error { message, boundary };
            }
        };

        // Same order as `urls`
        let Some(page) = modules.next() else {
            return NavState::Error {
                message: format!("No module returned for {page}"),
                boundary: None,
            };
        };
        let layout_modules: Vec<_> = modules.by_ref().take(layouts.len()).collect();
        let loading = loading.and_then(|_| modules.next());
        let error = error.and_then(|_| modules.next());

        NavState::Rendered {
            path,
            tree: compose(LoadedRoute {
                page,
                layouts: layout_modules,
                loading,
                error,
                params,
            }),
        }
    }

    async fn load_not_found(
        &self,
        version: u64,
        boundary: &NotFoundBoundary,
    ) -> Option<RenderNode<H::Module>> {
        let mut urls: Vec<&str> = vec![boundary.path.as_str()];
        urls.extend(boundary.layout_paths.iter().map(String::as_str));

        match self.load_all(version, &urls).await {
            Ok(mut modules) => {
                let module = modules.remove(0);
                Some(compose_not_found(module, modules))
            }
            Err(err) => {
                warn!(path = %boundary.path, error = %err, "failed to load not-found module");
                None
            }
        }
    }

    async fn load_error_boundary(
        &self,
        version: u64,
        error_path: &str,
        layouts: &[String],
        message: String,
        params: &Params,
    ) -> Option<RenderNode<H::Module>> {
        let mut urls: Vec<&str> = vec![error_path];
        urls.extend(layouts.iter().map(String::as_str));

        match self.load_all(version, &urls).await {
            Ok(mut modules) => {
                let module = modules.remove(0);
                Some(compose_error(module, message, modules, params))
            }
            Err(err) => {
                warn!(path = %error_path, error = %err, "failed to load error module");
                None
            }
        }
    }

    /// Load every path concurrently; the first failure wins.
    async fn load_all(
        &self,
        version: u64,
        paths: &[&str],
    ) -> std::result::Result<Vec<H::Module>, LoadError> {
        let urls: Vec<String> = paths.iter().map(|p| with_version(p, version)).collect();
        join_all(urls.iter().map(|url| self.host.load_module(url)))
            .await
            .into_iter()
            .collect()
    }

    /// The cached table, or a freshly fetched one when the cache is stale.
    ///
    /// A fetch that returns after a reload changed the version is handed to
    /// its caller (whose commit will be superseded) but never installed.
    async fn ensure_table(&self) -> Result<Arc<RouteTable>> {
        let version = {
            let inner = self.inner.lock();
            if let (Some(table), false) = (&inner.table, inner.table_stale) {
                return Ok(Arc::clone(table));
            }
            inner.version
        };

        let manifest = self.host.fetch_manifest().await?;
        let table = Arc::new(manifest.into_table().map_err(NavigatorError::from)?);

        let mut inner = self.inner.lock();
        if inner.version != version {
            debug!(version, current = inner.version, "discarding outdated route table");
            return Ok(table);
        }
        debug!(routes = table.len(), version, "route table loaded");
        inner.table = Some(Arc::clone(&table));
        inner.table_stale = false;
        Ok(table)
    }

    fn commit(&self, sequence: u64, version: u64, next: NavState<H::Module>) -> Resolution {
        let mut inner = self.inner.lock();
        if self.sequence.load(Ordering::SeqCst) != sequence || inner.version != version {
            debug!(sequence, "discarding superseded resolution");
            return Resolution::Superseded;
        }
        inner.state = next;
        Resolution::Applied
    }
}

/// Append `v=<version>` to a module path.
pub fn with_version(path: &str, version: u64) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}v={version}")
}

/// The `v` query parameter of a module URL, if any.
pub fn version_marker(url: &str) -> Option<u64> {
    let base = Url::parse("http://localhost/").ok()?;
    let parsed = base.join(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .and_then(|(_, value)| value.parse().ok())
}
