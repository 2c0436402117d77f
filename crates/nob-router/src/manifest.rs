//! Wire format of the route table.
//!
//! The server serves a [`RouteManifest`] as JSON; the client rebuilds a
//! [`RouteTable`] from it by recompiling every pattern string with the same
//! compiler the server uses.

use crate::error::Result;
use crate::pattern::CompiledPattern;
use crate::table::{NotFoundBoundary, Route, RouteTable};
use serde::{Deserialize, Serialize};

/// Serialized route table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteManifest {
    pub routes: Vec<RouteEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_found: Vec<NotFoundEntry>,
}

/// Serialized route record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub pattern: String,
    #[serde(default)]
    pub param_names: Vec<String>,
    pub page_path: String,
    #[serde(default)]
    pub layout_paths: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_found_path: Option<String>,
}

/// Serialized not-found boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundEntry {
    pub scope: String,
    pub path: String,
    #[serde(default)]
    pub layout_paths: Vec<String>,
}

impl RouteManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Render the manifest as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Recompile every pattern and rebuild the ordered table.
    ///
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn into_table(self) -> Result<RouteTable> {
        let routes = self
            .routes
            .into_iter()
            .map(|entry| -> Result<Route> {
                Ok(Route {
                    pattern: CompiledPattern::compile(&entry.pattern)?,
                    page_path: entry.page_path,
                    layout_paths: entry.layout_paths,
                    loading_path: entry.loading_path,
                    error_path: entry.error_path,
                    not_found_path: entry.not_found_path,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let not_found = self
            .not_found
            .into_iter()
            .map(|entry| -> Result<NotFoundBoundary> {
                Ok(NotFoundBoundary {
                    scope: CompiledPattern::compile(&entry.scope)?,
                    path: entry.path,
                    layout_paths: entry.layout_paths,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RouteTable::new(routes, not_found))
    }
}

impl From<&RouteTable> for RouteManifest {
    fn from(table: &RouteTable) -> Self {
        table.to_manifest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let manifest = RouteManifest {
            routes: vec![RouteEntry {
                pattern: "/blog/[slug]".into(),
                param_names: vec!["slug".into()],
                page_path: "/app/blog/[slug]/page.tsx".into(),
                layout_paths: vec!["/app/blog/layout.tsx".into()],
                loading_path: None,
                error_path: Some("/app/error.tsx".into()),
                not_found_path: None,
            }],
            not_found: Vec::new(),
        };

        let value: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        let entry = &value["routes"][0];
        assert_eq!(entry["pattern"], "/blog/[slug]");
        assert_eq!(entry["paramNames"][0], "slug");
        assert_eq!(entry["pagePath"], "/app/blog/[slug]/page.tsx");
        assert_eq!(entry["layoutPaths"][0], "/app/blog/layout.tsx");
        assert_eq!(entry["errorPath"], "/app/error.tsx");
        assert!(entry.get("loadingPath").is_none());
        assert!(entry.get("regex").is_none());
    }

    #[test]
    fn test_accepts_null_boundaries() {
        let text = r#"{"routes":[{"pattern":"/","paramNames":[],"pagePath":"/app/page.tsx",
            "layoutPaths":[],"loadingPath":null,"errorPath":null,"notFoundPath":null}]}"#;
        let table = RouteManifest::from_json(text).unwrap().into_table().unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.routes()[0].loading_path.is_none());
    }

    #[test]
    fn test_invalid_pattern_surfaces_error() {
        let text = r#"{"routes":[{"pattern":"/[...a]/b","pagePath":"/app/x/page.tsx"}]}"#;
        let err = RouteManifest::from_json(text).unwrap().into_table().unwrap_err();
        assert!(err.to_string().contains("last segment"));
    }
}
