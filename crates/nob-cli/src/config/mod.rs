//! Configuration for the nob dev server.
//!
//! Merges settings from defaults, `nob.config.json`, environment variables
//! and CLI flags. Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use indexmap::IndexMap;
use nob_router::DiscoveryConfig;
use nob_transform::{Alias, AliasConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

pub use defaults::*;
pub use loading::{CONFIG_FILE_NAME, ConfigOverrides, env_key};

/// nob configuration - loaded from nob.config.json, `NOB_*` variables and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NobConfig {
    /// Project root; every served path is relative to it
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Directory under the root holding the route conventions
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    /// Address to bind (`localhost` is accepted)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind; the next free port up to +10 is used if it is busy
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefixes whose extensionless requests are treated as modules
    #[serde(default = "default_module_roots")]
    pub module_roots: Vec<String>,

    /// Directory served verbatim under `/<publicDir>/`
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Specifier prefix → directory relative to the root
    #[serde(default = "default_aliases")]
    pub aliases: IndexMap<String, String>,

    /// Minimum time between two reload broadcasts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Extra watcher ignore patterns (`name` or `*.ext`)
    #[serde(default)]
    pub watch_ignore: Vec<String>,

    /// Module the shell page loads first
    #[serde(default = "default_bootstrap")]
    pub bootstrap: String,

    /// `<title>` of the shell page
    #[serde(default = "default_title")]
    pub title: String,

    /// Package providing the automatic JSX runtime
    #[serde(default = "default_jsx_import_source")]
    pub jsx_import_source: String,

    /// Bare specifier → URL entries of the shell's import map
    #[serde(default = "default_import_map")]
    pub import_map: IndexMap<String, String>,
}

impl Default for NobConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            app_dir: default_app_dir(),
            host: default_host(),
            port: default_port(),
            module_roots: default_module_roots(),
            public_dir: default_public_dir(),
            aliases: default_aliases(),
            debounce_ms: default_debounce_ms(),
            watch_ignore: Vec::new(),
            bootstrap: default_bootstrap(),
            title: default_title(),
            jsx_import_source: default_jsx_import_source(),
            import_map: default_import_map(),
        }
    }
}

impl NobConfig {
    /// Defaults rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Absolute-or-relative path of the app directory.
    pub fn app_path(&self) -> PathBuf {
        self.root.join(self.app_dir.trim_matches('/'))
    }

    /// Path of the public directory.
    pub fn public_path(&self) -> PathBuf {
        self.root.join(self.public_dir.trim_matches('/'))
    }

    /// URL prefix of the public directory, e.g. `/public/`.
    pub fn public_prefix(&self) -> String {
        format!("/{}/", self.public_dir.trim_matches('/'))
    }

    /// Module roots normalized to `/name/`, with the app directory's prefix
    /// added when no module root names it.
    pub fn module_prefixes(&self) -> Vec<String> {
        let mut prefixes: Vec<String> = self
            .module_roots
            .iter()
            .map(|root| format!("/{}/", root.trim_matches('/')))
            .collect();

        let app = format!("/{}/", self.app_dir.trim_matches('/'));
        if !prefixes.contains(&app) {
            prefixes.push(app);
        }
        prefixes
    }

    /// The bind address; `localhost` maps to the IPv4 loopback.
    pub fn host_ip(&self) -> Option<IpAddr> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Some(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.host.parse().ok()
    }

    /// Route discovery settings for this project.
    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig::for_project(&self.root, &self.app_dir)
    }

    /// Alias table for the transform pipeline.
    pub fn alias_config(&self) -> AliasConfig {
        let aliases = self
            .aliases
            .iter()
            .map(|(prefix, target)| Alias::new(prefix.clone(), target.clone()))
            .collect();
        AliasConfig::new(self.root.clone(), aliases)
    }

    /// Directories the watcher follows: every existing module root, the app
    /// directory unless a module root already covers it, and the public
    /// directory. Falls back to the whole root if none exist.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .module_roots
            .iter()
            .map(|name| self.root.join(name.trim_matches('/')))
            .filter(|dir| dir.is_dir())
            .collect();

        let app = self.app_path();
        if app.is_dir() && !roots.iter().any(|root| app.starts_with(root)) {
            roots.push(app);
        }

        let public = self.public_path();
        if public.is_dir() {
            roots.push(public);
        }
        roots.dedup();

        if roots.is_empty() {
            roots.push(self.root.clone());
        }
        roots
    }

    /// Built-in watcher ignores followed by the configured ones.
    pub fn ignore_patterns(&self) -> Vec<String> {
        let mut patterns: Vec<String> = DEFAULT_WATCH_IGNORE
            .iter()
            .map(|pattern| pattern.to_string())
            .collect();
        patterns.extend(self.watch_ignore.iter().cloned());
        patterns
    }
}
