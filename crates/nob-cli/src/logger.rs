//! Logging setup for the nob CLI.
//!
//! Library crates emit `tracing` events; this module installs the subscriber
//! that prints them.
//!
//! - `--verbose` turns on debug events from every `nob` crate
//! - `--quiet` keeps errors only
//! - otherwise `RUST_LOG` is honoured, falling back to info
//!
//! ```rust,no_run
//! use nob_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("listening");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "nob=debug,nob_cli=debug,nob_router=debug,nob_transform=debug";
const QUIET_FILTER: &str = "nob=error,nob_cli=error,nob_router=error,nob_transform=error";
const DEFAULT_FILTER: &str = "nob=info,nob_cli=info,nob_router=info,nob_transform=info";

/// Filter for the given verbosity flags.
///
/// `verbose` wins over `quiet`; with neither set, `RUST_LOG` is read.
pub fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber.
///
/// Must be called once, before any events are emitted.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(build_filter(verbose, quiet), no_color);
}

/// Initialize the global subscriber with a custom filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Whether log output should be colored.
///
/// `NO_COLOR` disables colors, `FORCE_COLOR` forces them, otherwise the
/// terminal's capabilities decide.
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::Term::stderr().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_verbose_filter() {
        let filter = build_filter(true, true).to_string();
        assert!(filter.contains("nob_cli=debug"));
        assert!(filter.contains("nob_transform=debug"));
    }

    #[test]
    fn test_quiet_filter() {
        let filter = build_filter(false, true).to_string();
        assert!(filter.contains("nob_router=error"));
        assert!(!filter.contains("debug"));
    }

    #[test]
    #[serial]
    fn test_should_use_colors_respects_force_color() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(should_use_colors());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_no_color_wins() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_colors());
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
