use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

/// Available nob subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the development server
    ///
    /// Serves transformed modules on demand, the route manifest at
    /// /__routes and live-reload events at /__reload.
    Dev(DevArgs),

    /// Print the route table discovered in the app directory
    Routes(RoutesArgs),
}

/// Options shared by every command that reads a project.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root directory
    ///
    /// Defaults to the current directory. nob.config.json is looked up here.
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a config file other than <root>/nob.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the dev command
#[derive(Args, Debug, Clone, Default)]
pub struct DevArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Port to listen on (falls back to the next free port)
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Open the browser once the server is listening
    #[arg(long)]
    pub open: bool,
}

impl DevArgs {
    /// Flags that override file and environment configuration.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.project.root.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Arguments for the routes command
#[derive(Args, Debug, Clone, Default)]
pub struct RoutesArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Print the JSON manifest served at /__routes instead of a table
    #[arg(long)]
    pub json: bool,
}

impl RoutesArgs {
    /// Flags that override file and environment configuration.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.project.root.clone(),
            ..ConfigOverrides::default()
        }
    }
}
