//! Error types for pattern compilation.

use thiserror::Error;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A catch-all segment was followed by further segments.
    #[error("catch-all segment `[...{name}]` must be the last segment of `{pattern}`")]
    CatchAllNotTrailing {
        /// Full pattern
        pattern: String,
        /// Name of the offending catch-all parameter
        name: String,
    },

    /// The same parameter name was captured twice.
    #[error("parameter `{name}` appears more than once in `{pattern}`")]
    DuplicateParam {
        /// Full pattern
        pattern: String,
        /// Duplicated parameter name
        name: String,
    },

    /// The generated matcher expression was rejected.
    #[error("failed to compile matcher for `{pattern}`: {source}")]
    Regex {
        /// Full pattern
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },
}

/// Result type alias for pattern operations.
pub type Result<T> = std::result::Result<T, PatternError>;
