//! Path-alias rewriting for import specifiers.
//!
//! Browsers only understand relative, absolute and bare specifiers that an
//! import map covers. Project aliases such as `@/components/Button` are
//! rewritten to absolute serve-paths (`/components/Button.tsx`) after
//! lowering.

use path_clean::PathClean;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Extensions tried when resolving an alias target, in order. The empty
/// string accepts a specifier that already names a file.
pub const RESOLVE_EXTENSIONS: &[&str] = &[".tsx", ".ts", ".jsx", ".js", ""];

// `from '…'`, `import '…'` and `import('…')`
static SPECIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\bfrom\s*|\bimport\s*\(\s*|\bimport\s+)(["'])([^"'\n]+)(["'])"#)
        .expect("specifier regex is valid")
});

/// One alias prefix and the project directory it points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Specifier prefix, e.g. `@/`
    pub prefix: String,
    /// Target directory relative to the project root (`.` for the root)
    pub target: PathBuf,
}

impl Alias {
    pub fn new(prefix: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }
}

/// Alias table for one project.
#[derive(Debug, Clone)]
pub struct AliasConfig {
    root: PathBuf,
    aliases: Vec<Alias>,
}

impl AliasConfig {
    /// Aliases resolved against `root`. Longer prefixes are tried first.
    pub fn new(root: impl Into<PathBuf>, mut aliases: Vec<Alias>) -> Self {
        aliases.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            root: root.into(),
            aliases,
        }
    }

    /// The conventional `@/` → project root mapping.
    pub fn with_default(root: impl Into<PathBuf>) -> Self {
        Self::new(root, vec![Alias::new("@/", ".")])
    }

    /// No aliases at all.
    pub fn none(root: impl Into<PathBuf>) -> Self {
        Self::new(root, Vec::new())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    /// Rewrite every aliased specifier in `code`.
    pub fn rewrite(&self, code: &str) -> String {
        if self.aliases.is_empty() {
            return code.to_string();
        }

        SPECIFIER_RE
            .replace_all(code, |caps: &Captures<'_>| match self.resolve(&caps[3]) {
                Some(resolved) => format!("{}{}{}{}", &caps[1], &caps[2], resolved, &caps[4]),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Serve-path for an aliased specifier, or `None` if no alias applies.
    ///
    /// Unresolvable targets fall back to the literal path without an
    /// extension, so the browser reports a 404 for the right URL.
    pub fn resolve(&self, specifier: &str) -> Option<String> {
        let alias = self
            .aliases
            .iter()
            .find(|alias| specifier.starts_with(alias.prefix.as_str()))?;
        let rest = &specifier[alias.prefix.len()..];
        let relative = alias.target.join(rest).clean();

        if let Some(found) = self.find_file(&relative) {
            debug!(specifier, resolved = %found, "resolved alias");
            return Some(found);
        }

        debug!(specifier, "alias target not found, using literal path");
        Some(serve_path(&relative, ""))
    }

    fn find_file(&self, relative: &Path) -> Option<String> {
        let base = self.root.join(relative);

        for ext in RESOLVE_EXTENSIONS {
            if is_file(&append(&base, ext)) {
                return Some(serve_path(relative, ext));
            }
        }

        for ext in RESOLVE_EXTENSIONS {
            if is_file(&base.join(format!("index{ext}"))) {
                return Some(serve_path(&relative.join("index"), ext));
            }
        }

        None
    }
}

fn append(path: &Path, ext: &str) -> PathBuf {
    let mut joined = path.as_os_str().to_owned();
    joined.push(ext);
    PathBuf::from(joined)
}

fn is_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

fn serve_path(relative: &Path, ext: &str) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}{}", parts.join("/"), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("components/ui")).unwrap();
        fs::create_dir_all(dir.path().join("lib/db")).unwrap();
        fs::write(dir.path().join("components/Button.tsx"), "").unwrap();
        fs::write(dir.path().join("lib/format.ts"), "").unwrap();
        fs::write(dir.path().join("lib/data.json"), "").unwrap();
        fs::write(dir.path().join("components/ui/index.tsx"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolves_with_extension_lookup() {
        let dir = project();
        let aliases = AliasConfig::with_default(dir.path());

        assert_eq!(
            aliases.resolve("@/components/Button").as_deref(),
            Some("/components/Button.tsx")
        );
        assert_eq!(aliases.resolve("@/lib/format").as_deref(), Some("/lib/format.ts"));
        assert_eq!(aliases.resolve("@/lib/data.json").as_deref(), Some("/lib/data.json"));
    }

    #[test]
    fn test_resolves_directory_index() {
        let dir = project();
        let aliases = AliasConfig::with_default(dir.path());
        assert_eq!(
            aliases.resolve("@/components/ui").as_deref(),
            Some("/components/ui/index.tsx")
        );
    }

    #[test]
    fn test_unresolved_falls_back_to_literal() {
        let dir = project();
        let aliases = AliasConfig::with_default(dir.path());
        assert_eq!(aliases.resolve("@/missing/thing").as_deref(), Some("/missing/thing"));
        assert_eq!(aliases.resolve("react"), None);
    }

    #[test]
    fn test_rewrites_all_specifier_forms() {
        let dir = project();
        let aliases = AliasConfig::with_default(dir.path());
        let code = concat!(
            "import { Button } from \"@/components/Button\";\n",
            "import '@/lib/format';\n",
            "export * from \"@/lib/format\";\n",
            "const ui = import(\"@/components/ui\");\n",
            "import React from \"react\";\n",
        );

        let out = aliases.rewrite(code);
        assert!(out.contains("from \"/components/Button.tsx\""));
        assert!(out.contains("import '/lib/format.ts'"));
        assert!(out.contains("export * from \"/lib/format.ts\""));
        assert!(out.contains("import(\"/components/ui/index.tsx\")"));
        assert!(out.contains("from \"react\""));
    }

    #[test]
    fn test_target_directory() {
        let dir = project();
        let aliases = AliasConfig::new(dir.path(), vec![Alias::new("~lib/", "lib")]);
        assert_eq!(aliases.resolve("~lib/format").as_deref(), Some("/lib/format.ts"));
    }
}
