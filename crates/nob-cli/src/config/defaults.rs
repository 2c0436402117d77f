use crate::dev::shell::CLIENT_SCRIPT_PATH;
use indexmap::IndexMap;
use std::path::PathBuf;

/// Watcher ignores applied before any configured ones.
pub const DEFAULT_WATCH_IGNORE: &[&str] = &["node_modules", "dist", "target", "*.log", "*.swp", "*~"];

pub fn default_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_app_dir() -> String {
    "app".to_string()
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_module_roots() -> Vec<String> {
    ["/app/", "/client/", "/components/", "/data/", "/lib/", "/utils/"]
        .iter()
        .map(|root| root.to_string())
        .collect()
}

pub fn default_public_dir() -> String {
    "public".to_string()
}

pub fn default_aliases() -> IndexMap<String, String> {
    IndexMap::from([("@/".to_string(), ".".to_string())])
}

pub fn default_debounce_ms() -> u64 {
    1000
}

pub fn default_bootstrap() -> String {
    CLIENT_SCRIPT_PATH.to_string()
}

pub fn default_title() -> String {
    "nob".to_string()
}

pub fn default_jsx_import_source() -> String {
    nob_transform::DEFAULT_JSX_IMPORT_SOURCE.to_string()
}

pub fn default_import_map() -> IndexMap<String, String> {
    [
        ("react", "https://esm.sh/react@19?dev"),
        ("react/jsx-runtime", "https://esm.sh/react@19/jsx-runtime?dev"),
        ("react/jsx-dev-runtime", "https://esm.sh/react@19/jsx-dev-runtime?dev"),
        ("react-dom", "https://esm.sh/react-dom@19?dev"),
        ("react-dom/client", "https://esm.sh/react-dom@19/client?dev"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}
