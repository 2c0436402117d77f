//! Command-line interface definition for nob.
//!
//! # Command Structure
//!
//! - `nob dev` - Serve the project with live reload
//! - `nob routes` - Print the discovered route table

mod commands;

use clap::Parser;

pub use commands::{Command, DevArgs, ProjectArgs, RoutesArgs};

/// nob - file-convention routes served straight from source
#[derive(Parser, Debug)]
#[command(
    name = "nob",
    version,
    about = "A no-build development server with file-convention routing",
    long_about = "nob serves a directory of TypeScript/JSX modules to the browser without a\n\
                  bundling step. Routes come from the app/ directory layout, every module is\n\
                  transformed on request and cached until it changes, and connected pages are\n\
                  told to reload when a source file is saved."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
