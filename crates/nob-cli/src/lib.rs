//! nob CLI - a development server for file-convention routes.
//!
//! Source modules are transformed on request, routes are discovered from the
//! app directory and browsers are told to reload over Server-Sent Events.
//! Nothing is bundled and nothing is written to disk.
//!
//! # Architecture
//!
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output helpers
//! - [`config`] - `nob.config.json`, environment and flag merging
//! - [`dev`] - Development server, watcher and reload loop
//! - [`commands`] - Command implementations
//!
//! # Example
//!
//! ```rust,no_run
//! use nob_cli::config::NobConfig;
//! use nob_cli::dev::{DevServerState, build_router};
//! use std::sync::Arc;
//!
//! let state = Arc::new(DevServerState::new(&NobConfig::for_root(".")));
//! let app = build_router(state);
//! # let _ = app;
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

// Re-export commonly used types
pub use error::{CliError, ConfigError, Result, ResultExt};
