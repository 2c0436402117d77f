use crate::config::NobConfig;
use crate::error::{ConfigError, Result};

impl NobConfig {
    /// Validate configuration for logical consistency.
    ///
    /// Checks that the root and app directories exist, the host parses, the
    /// port is non-zero and every alias and module root is well formed.
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(ConfigError::MissingDirectory {
                field: "root".to_string(),
                path: self.root.clone(),
                hint: "Run nob from your project directory or pass --root".to_string(),
            }
            .into());
        }

        let app = self.app_path();
        if !app.is_dir() {
            return Err(ConfigError::MissingDirectory {
                field: "appDir".to_string(),
                path: app,
                hint: format!(
                    "Create {}/page.tsx or point appDir at your routes directory",
                    self.app_dir.trim_matches('/')
                ),
            }
            .into());
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: "Use a port between 1 and 65535".to_string(),
            }
            .into());
        }

        if self.host_ip().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: "Use an IP address such as 127.0.0.1 or 0.0.0.0, or localhost".to_string(),
            }
            .into());
        }

        if let Some((prefix, _)) = self.aliases.iter().find(|(prefix, _)| prefix.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "aliases".to_string(),
                value: format!("{:?}", prefix),
                hint: "Alias prefixes cannot be empty; use something like \"@/\"".to_string(),
            }
            .into());
        }

        if let Some(root) = self
            .module_roots
            .iter()
            .find(|root| root.trim_matches('/').is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: "moduleRoots".to_string(),
                value: format!("{:?}", root),
                hint: "Module roots name a directory, e.g. \"/lib/\"".to_string(),
            }
            .into());
        }

        if self.app_dir.trim_matches('/').is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "appDir".to_string(),
                value: format!("{:?}", self.app_dir),
                hint: "appDir must name a directory under the root".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
