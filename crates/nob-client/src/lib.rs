//! # nob-client
//!
//! The browser-side router as a host-agnostic state machine.
//!
//! The navigator rebuilds the server's route table from the `/__routes`
//! manifest with the same `nob-router` compiler, so a path selects the same
//! route on both sides. Module loading, manifest fetching and history are
//! delegated to a [`NavigatorHost`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nob_client::{Navigator, NavState};
//!
//! let navigator = Navigator::new(host, initial_version);
//! navigator.mount("/blog/hello-world").await?;
//! if let NavState::Rendered { tree, .. } = navigator.state() {
//!     render(tree);
//! }
//!
//! // On `{"type":"reload","version":V}` from /__reload
//! navigator.reload(v).await?;
//! ```

pub mod error;
pub mod host;
pub mod link;
pub mod navigator;
pub mod render;

pub use error::{LoadError, NavigatorError, Result};
pub use host::NavigatorHost;
pub use link::{LinkClick, LinkDecision, intercept_link};
pub use navigator::{NavState, Navigator, Resolution, version_marker, with_version};
pub use render::{LoadedRoute, RenderNode, compose, compose_error, compose_not_found};
