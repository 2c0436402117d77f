//! Route records and the ordered route table.

use crate::manifest::{NotFoundEntry, RouteEntry, RouteManifest};
use crate::pattern::{CompiledPattern, Params};

/// One discovered route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Compiled URL pattern
    pub pattern: CompiledPattern,
    /// Serve-path of the page module (e.g. `/app/blog/page.tsx`)
    pub page_path: String,
    /// Wrapper modules, outermost first
    pub layout_paths: Vec<String>,
    /// Nearest loading placeholder
    pub loading_path: Option<String>,
    /// Nearest error boundary
    pub error_path: Option<String>,
    /// Nearest not-found fallback
    pub not_found_path: Option<String>,
}

impl Route {
    /// The pattern string, e.g. `/blog/[slug]`.
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Parameter names in capture order.
    pub fn param_names(&self) -> &[String] {
        self.pattern.param_names()
    }
}

/// A not-found file together with the wrapper chain of its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundBoundary {
    /// URL pattern of the directory defining the file
    pub scope: CompiledPattern,
    /// Serve-path of the not-found module
    pub path: String,
    /// Wrapper modules in effect for that directory, outermost first
    pub layout_paths: Vec<String>,
}

/// Result of matching a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: Params,
}

/// Routes sorted so that the first structural match is the most specific.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
    not_found: Vec<NotFoundBoundary>,
}

impl RouteTable {
    /// Build a table, sorting routes by specificity.
    ///
    /// Input order does not matter; the output order is fully determined
    /// by the patterns.
    pub fn new(mut routes: Vec<Route>, mut not_found: Vec<NotFoundBoundary>) -> Self {
        sort_routes(&mut routes);

        // Deepest scope first so lookups can stop at the first hit
        not_found.sort_by(|a, b| {
            b.scope
                .segments()
                .len()
                .cmp(&a.scope.segments().len())
                .then_with(|| a.scope.as_str().cmp(b.scope.as_str()))
        });

        Self { routes, not_found }
    }

    /// Routes in match-priority order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Not-found boundaries, deepest scope first.
    pub fn not_found_boundaries(&self) -> &[NotFoundBoundary] {
        &self.not_found
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// First route (in priority order) whose pattern matches `path`.
    pub fn match_path(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|route| {
            route
                .pattern
                .match_path(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    /// Nearest not-found boundary covering `path`.
    pub fn not_found_for(&self, path: &str) -> Option<&NotFoundBoundary> {
        self.not_found
            .iter()
            .find(|boundary| boundary.scope.matches_prefix(path))
    }

    /// Serializable snapshot for the client. Matchers are not included.
    pub fn to_manifest(&self) -> RouteManifest {
        RouteManifest {
            routes: self
                .routes
                .iter()
                .map(|route| RouteEntry {
                    pattern: route.pattern_str().to_string(),
                    param_names: route.param_names().to_vec(),
                    page_path: route.page_path.clone(),
                    layout_paths: route.layout_paths.clone(),
                    loading_path: route.loading_path.clone(),
                    error_path: route.error_path.clone(),
                    not_found_path: route.not_found_path.clone(),
                })
                .collect(),
            not_found: self
                .not_found
                .iter()
                .map(|boundary| NotFoundEntry {
                    scope: boundary.scope.as_str().to_string(),
                    path: boundary.path.clone(),
                    layout_paths: boundary.layout_paths.clone(),
                })
                .collect(),
        }
    }
}

/// Sort routes most specific first, pattern string as final tie-break.
pub fn sort_routes(routes: &mut [Route]) {
    routes.sort_by(|a, b| {
        a.pattern
            .specificity()
            .cmp(&b.pattern.specificity())
            .then_with(|| a.pattern_str().cmp(b.pattern_str()))
    });
}
