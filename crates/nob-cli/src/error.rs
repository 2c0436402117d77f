//! Error handling for the nob CLI.
//!
//! Library crates report their own error types; this module folds them into
//! one hierarchy for the binary:
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`) carry an actionable hint
//! - **Error conversion** is automatic via `#[from]` attributes
//! - **Path context** ([`ResultExt::with_path`]) turns a bare `NotFound`
//!   I/O error into one naming the missing file
//!
//! # Example
//!
//! ```rust,no_run
//! use nob_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn canonical_root(path: &Path) -> Result<std::path::PathBuf> {
//!     path.canonicalize().with_path(path)
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (invalid values, missing directories)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure turning a source file into a servable module
    #[error("Transform error: {0}")]
    Transform(#[from] nob_transform::TransformError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors raised while loading or validating `nob.config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicit `--config` path doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a nob.config.json file or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// Merged configuration could not be deserialized
    #[error("Invalid configuration: {message}\n\nHint: Check nob.config.json syntax and NOB_* environment variables")]
    Extract {
        /// Figment's description of the failure
        message: String,
    },

    /// A configured directory is missing
    #[error("Directory not found for '{field}': {}\n\nHint: {hint}", .path.display())]
    MissingDirectory {
        /// Name of the config field
        field: String,
        /// Resolved path that does not exist
        path: PathBuf,
        /// Helpful hint for fixing the path
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Replace a not-found I/O error with [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }
}
