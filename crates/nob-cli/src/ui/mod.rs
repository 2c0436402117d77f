//! Terminal output for humans.
//!
//! `tracing` carries the structured log; these helpers print the short status
//! lines and tables a developer reads while the server runs.
//!
//! ```no_run
//! use nob_cli::ui;
//!
//! ui::init_colors();
//! ui::success("Development server running at http://127.0.0.1:3000");
//! ```

mod format;
mod messages;

pub use format::{format_duration, format_route_table, print_route_table};
pub use messages::{debug, error, info, success, warning};

use std::sync::atomic::{AtomicBool, Ordering};

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to whether stderr is
/// attended by a user.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr() && !is_ci()
}

/// Apply the color decision globally.
///
/// `no_color` comes from the `--no-color` flag and always wins.
pub fn init_colors_with(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

/// Whether status lines are printed with ANSI colors.
pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// Apply the color decision from the environment alone.
pub fn init_colors() {
    init_colors_with(false);
}
