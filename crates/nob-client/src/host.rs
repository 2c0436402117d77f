//! Environment abstraction for the navigator.
//!
//! The navigator never touches the network or the history stack itself. A
//! host implementation supplies those, which keeps the state machine
//! testable with an in-memory host.

use crate::error::LoadError;
use async_trait::async_trait;
use nob_router::RouteManifest;

/// Capabilities the navigator needs from its environment.
///
/// `Module` is whatever the host hands back for an imported module (a
/// component handle in the browser, a plain URL in tests).
#[cfg(target_family = "wasm")]
#[async_trait(?Send)]
pub trait NavigatorHost: Send + Sync {
    type Module: Clone + std::fmt::Debug;

    /// Fetch the route manifest (`GET /__routes`).
    async fn fetch_manifest(&self) -> Result<RouteManifest, LoadError>;

    /// Import the module at `url`. The URL already carries `?v=<version>`.
    async fn load_module(&self, url: &str) -> Result<Self::Module, LoadError>;

    /// Push an entry onto the history stack.
    fn push_history(&self, href: &str);
}

/// Capabilities the navigator needs from its environment.
///
/// `Module` is whatever the host hands back for an imported module (a
/// component handle in the browser, a plain URL in tests).
#[cfg(not(target_family = "wasm"))]
#[async_trait]
pub trait NavigatorHost: Send + Sync {
    type Module: Clone + std::fmt::Debug + Send + Sync;

    /// Fetch the route manifest (`GET /__routes`).
    async fn fetch_manifest(&self) -> Result<RouteManifest, LoadError>;

    /// Import the module at `url`. The URL already carries `?v=<version>`.
    async fn load_module(&self, url: &str) -> Result<Self::Module, LoadError>;

    /// Push an entry onto the history stack.
    fn push_history(&self, href: &str);
}
