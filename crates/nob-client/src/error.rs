//! Error types for the navigator.

use nob_router::PatternError;
use thiserror::Error;

/// Failure reported by a [`NavigatorHost`](crate::NavigatorHost).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// The route table could not be fetched or decoded
    #[error("Failed to fetch route table: {0}")]
    Manifest(String),

    /// A module failed to import
    #[error("Failed to load {url}: {message}")]
    Module { url: String, message: String },
}

impl LoadError {
    pub fn module(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Module {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Errors that stop the navigator from resolving at all.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// The host could not provide the route table
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The route table contained a pattern the compiler rejects
    #[error("Invalid route table: {0}")]
    InvalidTable(#[from] PatternError),
}

/// Result type alias for navigator operations.
pub type Result<T> = std::result::Result<T, NavigatorError>;
