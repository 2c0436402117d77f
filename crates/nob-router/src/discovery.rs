//! File-convention route discovery.
//!
//! Walks the app directory and turns convention files into route records:
//!
//! ```text
//! app/
//! ├── layout.tsx          wrapper for everything below
//! ├── page.tsx            → /
//! ├── not-found.tsx       fallback for unmatched paths
//! ├── (marketing)/        grouping directory, no URL segment
//! │   └── about/page.tsx  → /about
//! └── blog/
//!     ├── layout.tsx
//!     ├── page.tsx        → /blog
//!     └── [slug]/page.tsx → /blog/[slug]
//! ```
//!
//! Traversal order is whatever the directory listing returns. The result is
//! made deterministic by [`RouteTable::new`], not by the walk.

use crate::pattern::CompiledPattern;
use crate::table::{NotFoundBoundary, Route, RouteTable};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source extensions recognized for convention files, in priority order.
pub const SOURCE_EXTENSIONS: &[&str] = &["tsx", "ts", "jsx", "js"];

/// Kinds of convention file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConventionFile {
    Page,
    Layout,
    Loading,
    Error,
    NotFound,
}

impl ConventionFile {
    pub const ALL: [ConventionFile; 5] = [
        ConventionFile::Page,
        ConventionFile::Layout,
        ConventionFile::Loading,
        ConventionFile::Error,
        ConventionFile::NotFound,
    ];

    /// File stem for this kind.
    pub fn stem(self) -> &'static str {
        match self {
            ConventionFile::Page => "page",
            ConventionFile::Layout => "layout",
            ConventionFile::Loading => "loading",
            ConventionFile::Error => "error",
            ConventionFile::NotFound => "not-found",
        }
    }

    /// Classify a file name, e.g. `layout.tsx` → `Layout`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::classify(name).map(|(kind, _)| kind)
    }

    /// Kind plus the extension's priority (lower wins).
    fn classify(name: &str) -> Option<(Self, usize)> {
        let (stem, ext) = name.rsplit_once('.')?;
        let rank = SOURCE_EXTENSIONS.iter().position(|candidate| *candidate == ext)?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.stem() == stem)
            .map(|kind| (kind, rank))
    }
}

/// Where to look for routes and how to name the modules found there.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Directory to walk
    pub app_dir: PathBuf,
    /// URL prefix of `app_dir` as served (e.g. `/app`)
    pub url_prefix: String,
}

impl DiscoveryConfig {
    pub fn new(app_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            app_dir: app_dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// `<root>/<app_dir_name>` served under `/<app_dir_name>`.
    pub fn for_project(root: &Path, app_dir_name: &str) -> Self {
        let name = app_dir_name.trim_matches('/');
        Self::new(root.join(name), format!("/{}", name))
    }

    fn serve_path(&self, dirs: &[String], file_name: &str) -> String {
        let mut path = self.url_prefix.trim_end_matches('/').to_string();
        for dir in dirs {
            path.push('/');
            path.push_str(dir);
        }
        path.push('/');
        path.push_str(file_name);
        path
    }
}

/// Unsorted output of a discovery pass.
#[derive(Debug, Clone, Default)]
pub struct Discovered {
    pub routes: Vec<Route>,
    pub not_found: Vec<NotFoundBoundary>,
}

impl Discovered {
    /// Sort into a route table.
    pub fn into_table(self) -> RouteTable {
        RouteTable::new(self.routes, self.not_found)
    }
}

/// Walk the app directory and build the ordered route table.
pub fn discover(config: &DiscoveryConfig) -> RouteTable {
    scan_routes(config).into_table()
}

/// Walk the app directory, returning records in traversal order.
pub fn scan_routes(config: &DiscoveryConfig) -> Discovered {
    let mut out = Discovered::default();
    scan_dir(config, &config.app_dir, &Inherited::default(), &mut out);
    debug!(
        routes = out.routes.len(),
        not_found = out.not_found.len(),
        app_dir = %config.app_dir.display(),
        "route discovery finished"
    );
    out
}

/// State passed from a directory to its children.
#[derive(Debug, Clone, Default)]
struct Inherited {
    /// Directory names below the app dir, groups included
    dirs: Vec<String>,
    /// URL segments, groups excluded
    segments: Vec<String>,
    layouts: Vec<String>,
    loading: Option<String>,
    error: Option<String>,
    not_found: Option<String>,
}

fn scan_dir(config: &DiscoveryConfig, dir: &Path, inherited: &Inherited, out: &mut Discovered) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };

    let mut found: [Option<(usize, String)>; 5] = Default::default();
    let mut subdirs = Vec::new();

    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_dir() {
            if !name.starts_with('.') && name != "node_modules" {
                subdirs.push(name);
            }
        } else if let Some((kind, rank)) = ConventionFile::classify(&name) {
            let slot = &mut found[kind as usize];
            if slot.as_ref().is_none_or(|(best, _)| rank < *best) {
                *slot = Some((rank, name));
            }
        }
    }

    let file = |kind: ConventionFile| {
        found[kind as usize]
            .as_ref()
            .map(|(_, name)| config.serve_path(&inherited.dirs, name))
    };

    let mut here = Inherited {
        dirs: inherited.dirs.clone(),
        segments: inherited.segments.clone(),
        layouts: inherited.layouts.clone(),
        loading: file(ConventionFile::Loading).or_else(|| inherited.loading.clone()),
        error: file(ConventionFile::Error).or_else(|| inherited.error.clone()),
        not_found: inherited.not_found.clone(),
    };
    if let Some(layout) = file(ConventionFile::Layout) {
        here.layouts.push(layout);
    }

    let pattern_str = format!("/{}", here.segments.join("/"));

    if let Some(not_found) = file(ConventionFile::NotFound) {
        match CompiledPattern::compile(&pattern_str) {
            Ok(scope) => out.not_found.push(NotFoundBoundary {
                scope,
                path: not_found.clone(),
                layout_paths: here.layouts.clone(),
            }),
            Err(err) => warn!(path = %not_found, error = %err, "skipping not-found boundary"),
        }
        here.not_found = Some(not_found);
    }

    if let Some(page_path) = file(ConventionFile::Page) {
        match CompiledPattern::compile(&pattern_str) {
            Ok(pattern) => {
                debug!(pattern = %pattern, page = %page_path, "discovered route");
                out.routes.push(Route {
                    pattern,
                    page_path,
                    layout_paths: here.layouts.clone(),
                    loading_path: here.loading.clone(),
                    error_path: here.error.clone(),
                    not_found_path: here.not_found.clone(),
                });
            }
            Err(err) => warn!(page = %page_path, error = %err, "skipping route"),
        }
    }

    for name in subdirs {
        let mut child = here.clone();
        child.dirs.push(name.clone());
        if !is_group_dir(&name) {
            child.segments.push(name.clone());
        }
        scan_dir(config, &dir.join(&name), &child, out);
    }
}

/// `(name)` directories organize files without adding a URL segment.
pub fn is_group_dir(name: &str) -> bool {
    name.starts_with('(') && name.ends_with(')')
}
