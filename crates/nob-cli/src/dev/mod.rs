//! Development server module.
//!
//! Serves a project straight from disk:
//! - Source modules transformed on request, cached until their file changes
//! - Route manifest discovered from the app directory
//! - Live reload via Server-Sent Events
//! - File watching with a trailing-edge debounce

pub mod config;
pub mod reload;
pub mod server;
pub mod shell;
pub mod state;
pub mod watcher;

// Re-exports
pub use config::DevConfig;
pub use reload::{DebounceAction, ReloadDebouncer, run_reload_loop};
pub use server::{DevServer, build_router};
pub use shell::render_shell;
pub use state::{DevServerState, ReloadClock, ReloadMessage, SessionRegistry, SharedState};
pub use watcher::{FileChange, FileWatcher};
