//! Error types for the transform pipeline.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning a source file into servable code.
///
/// None of these are cached; the next request tries again.
#[derive(Error, Debug, Diagnostic)]
pub enum TransformError {
    /// The file does not exist
    #[error("Module not found: {}", path.display())]
    #[diagnostic(code(nob::transform::not_found))]
    NotFound { path: PathBuf },

    /// The file exists but could not be stat'ed or read
    #[error("Failed to read {}: {source}", path.display())]
    #[diagnostic(code(nob::transform::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No language profile for this extension
    #[error("Unsupported file extension: {}", path.display())]
    #[diagnostic(
        code(nob::transform::unsupported_extension),
        help("Modules must end in .ts, .tsx, .js, .jsx or .mjs")
    )]
    UnsupportedExtension { path: PathBuf },

    /// Source failed to parse
    #[error("Failed to parse {}: {message}", path.display())]
    #[diagnostic(code(nob::transform::parse))]
    Parse { path: PathBuf, message: String },

    /// TypeScript/JSX lowering reported errors
    #[error("Failed to transform {}: {message}", path.display())]
    #[diagnostic(code(nob::transform::lower))]
    Lower { path: PathBuf, message: String },

    /// The blocking lowering task panicked or was cancelled
    #[error("Transform task failed: {0}")]
    #[diagnostic(code(nob::transform::join))]
    Join(#[from] tokio::task::JoinError),
}

impl TransformError {
    /// Whether this error means the module is missing (404 rather than 500).
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransformError::NotFound { .. })
    }

    pub(crate) fn from_io(path: &std::path::Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            TransformError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            TransformError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;
