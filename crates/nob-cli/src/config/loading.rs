use crate::config::{NobConfig, default_root};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "nob.config.json";

/// Values set on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl NobConfig {
    /// Load configuration from every source.
    /// Priority: CLI args > `NOB_*` variables > `PORT` > config file > defaults
    ///
    /// A relative `root` read from a config file is taken relative to that
    /// file's directory.
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let file = Self::config_file(overrides, config_path)?;
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = &file {
            debug!(path = %path.display(), "loading config file");
            figment = figment.merge(Json::file(path));
        }

        let figment = figment
            .merge(Env::raw().only(&["PORT"]))
            .merge(
                Env::prefixed("NOB_")
                    .map(|key| env_key(key.as_str()).into())
                    .lowercase(false),
            )
            .merge(Serialized::defaults(overrides));

        let mut config: Self = figment.extract().map_err(|e| ConfigError::Extract {
            message: e.to_string(),
        })?;

        if overrides.root.is_none() && config.root.is_relative() {
            if let Some(dir) = file.as_deref().and_then(Path::parent) {
                config.root = dir.join(&config.root);
            }
        }

        Ok(config)
    }

    fn config_file(overrides: &ConfigOverrides, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            return Ok(Some(path.to_path_buf()));
        }

        let base = overrides.root.clone().unwrap_or_else(default_root);
        let candidate = base.join(CONFIG_FILE_NAME);
        Ok(candidate.is_file().then_some(candidate))
    }
}

/// Field name for a `NOB_`-stripped environment key: `APP_DIR` → `appDir`.
pub fn env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (index, word) in key.split('_').filter(|w| !w.is_empty()).enumerate() {
        let word = word.to_ascii_lowercase();
        if index == 0 {
            out.push_str(&word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
