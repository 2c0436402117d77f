//! TypeScript/JSX lowering.
//!
//! ```text
//! source ─▶ Parser ─▶ SemanticBuilder ─▶ Transformer ─▶ Codegen ─▶ plain ESM
//! ```
//!
//! Types are stripped and JSX becomes calls into the automatic runtime
//! (`<jsx_import_source>/jsx-runtime`). Module syntax is left alone so the
//! browser resolves imports itself.

use crate::error::{Result, TransformError};
use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{JsxOptions, JsxRuntime, TransformOptions, Transformer};
use std::path::Path;

/// Default module the automatic JSX runtime is imported from.
pub const DEFAULT_JSX_IMPORT_SOURCE: &str = "react";

/// Turns one source file into browser-loadable JavaScript.
///
/// Runs on a blocking thread. Implementations must be deterministic for a
/// given `(path, source)`.
pub trait Lower: Send + Sync + 'static {
    fn lower(&self, path: &Path, source: &str) -> Result<String>;
}

/// Language profile for a path, chosen from its extension.
pub fn source_type(path: &Path) -> Result<SourceType> {
    SourceType::from_path(path).map_err(|_| TransformError::UnsupportedExtension {
        path: path.to_path_buf(),
    })
}

/// Lowering backed by the oxc transformer.
#[derive(Debug, Clone)]
pub struct OxcLowering {
    jsx_import_source: String,
}

impl OxcLowering {
    pub fn new(jsx_import_source: impl Into<String>) -> Self {
        Self {
            jsx_import_source: jsx_import_source.into(),
        }
    }

    fn options(&self) -> TransformOptions {
        TransformOptions {
            jsx: JsxOptions {
                runtime: JsxRuntime::Automatic,
                import_source: Some(self.jsx_import_source.clone()),
                ..JsxOptions::default()
            },
            ..TransformOptions::default()
        }
    }
}

impl Default for OxcLowering {
    fn default() -> Self {
        Self::new(DEFAULT_JSX_IMPORT_SOURCE)
    }
}

impl Lower for OxcLowering {
    fn lower(&self, path: &Path, source: &str) -> Result<String> {
        let source_type = source_type(path)?;
        let allocator = Allocator::default();

        let parsed = Parser::new(&allocator, source, source_type).parse();
        if !parsed.errors.is_empty() || parsed.panicked {
            return Err(TransformError::Parse {
                path: path.to_path_buf(),
                message: join_diagnostics(&parsed.errors),
            });
        }
        let mut program = parsed.program;

        let scoping = SemanticBuilder::new()
            .build(&program)
            .semantic
            .into_scoping();

        let options = self.options();
        let transformed =
            Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
        if !transformed.errors.is_empty() {
            return Err(TransformError::Lower {
                path: path.to_path_buf(),
                message: join_diagnostics(&transformed.errors),
            });
        }

        Ok(Codegen::new().build(&program).code)
    }
}

fn join_diagnostics<D: std::fmt::Display>(errors: &[D]) -> String {
    if errors.is_empty() {
        return "unrecoverable syntax error".to_string();
    }
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
