//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use ::miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // TransformError is already a Diagnostic with its own code
        CliError::Transform(e) => Report::new(e),
        CliError::Config(e) => config_error_to_miette(e),
        _ => ::miette::miette!("{}", err),
    }
}

/// Convert ConfigError to miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::MissingDirectory { field, path, hint } => ::miette::miette!(
            help = hint,
            "Directory for '{}' does not exist: {}",
            field,
            path.display()
        ),
        ConfigError::InvalidValue { field, value, hint } => {
            ::miette::miette!(help = hint, "Invalid value for '{}': {}", field, value)
        }
        other => ::miette::miette!("Configuration error: {}", other),
    }
}
