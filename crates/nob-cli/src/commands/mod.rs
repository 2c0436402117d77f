//! Command implementations for the nob CLI.
//!
//! - [`dev`] - Development server with live reload
//! - [`routes`] - Print the discovered route table
//!
//! Each command provides an `execute` function that takes the parsed
//! command arguments and returns a Result.

pub mod dev;
pub mod routes;

// Re-export execute functions for convenience
pub use dev::execute as dev_execute;
pub use routes::execute as routes_execute;
