//! # nob-transform
//!
//! Turns a requested source file into code a browser can import directly.
//!
//! ```text
//! request ─▶ stat ─▶ cache hit? ──yes──▶ cached code
//!                       │ no
//!                       ▼
//!            read ─▶ lower (oxc, blocking thread)
//!                       ▼
//!            alias rewrite (`@/x` → `/x.tsx`)
//!                       ▼
//!            wrapper rewrite (layout files only)
//!                       ▼
//!            store {mtime, code} ─▶ code
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nob_transform::{AliasConfig, TransformPipeline};
//! use std::path::Path;
//!
//! # async fn example() -> nob_transform::Result<()> {
//! let pipeline = TransformPipeline::new(AliasConfig::with_default("."), "react");
//! let code = pipeline.transform(Path::new("app/page.tsx")).await?;
//! println!("{code}");
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod error;
pub mod lower;
pub mod pipeline;
pub mod wrapper;

pub use alias::{Alias, AliasConfig};
pub use error::{Result, TransformError};
pub use lower::{DEFAULT_JSX_IMPORT_SOURCE, Lower, OxcLowering};
pub use pipeline::TransformPipeline;
