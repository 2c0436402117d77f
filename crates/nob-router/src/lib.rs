//! # nob-router
//!
//! File-convention routing for the nob dev server.
//!
//! This crate owns the one pattern compiler used by both the server and the
//! client navigator. It has no I/O apart from the directory walk in
//! [`discovery`], so the matching half can be compiled anywhere.
//!
//! ## Overview
//!
//! ```text
//!   app/ directory
//!        │  discovery::discover
//!        ▼
//!   ┌──────────────┐   to_manifest    ┌───────────────┐
//!   │  RouteTable  │ ───────────────▶ │ RouteManifest │ ── JSON ──▶ client
//!   │ (specificity │ ◀─────────────── │  (no regex)   │
//!   │   ordered)   │   into_table     └───────────────┘
//!   └──────┬───────┘
//!          │ match_path / not_found_for
//!          ▼
//!     RouteMatch { route, params }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nob_router::{discover, DiscoveryConfig};
//! use std::path::Path;
//!
//! let table = discover(&DiscoveryConfig::for_project(Path::new("."), "app"));
//! if let Some(hit) = table.match_path("/blog/hello-world") {
//!     println!("{} -> {}", hit.route.pattern_str(), hit.route.page_path);
//! }
//! ```

pub mod discovery;
pub mod error;
pub mod manifest;
pub mod pattern;
pub mod table;

pub use discovery::{
    ConventionFile, Discovered, DiscoveryConfig, SOURCE_EXTENSIONS, discover, is_group_dir,
    scan_routes,
};
pub use error::{PatternError, Result};
pub use manifest::{NotFoundEntry, RouteEntry, RouteManifest};
pub use pattern::{CompiledPattern, Params, Segment, Specificity, normalize_path};
pub use table::{NotFoundBoundary, Route, RouteMatch, RouteTable, sort_routes};
