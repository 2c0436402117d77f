//! Structural rewrite for wrapper (layout) modules.
//!
//! A root layout written for server rendering returns `<html><head/><body>`.
//! Rendered inside the shell page's mount node that would nest a second
//! document, so after lowering the `html`, `body` and `head` element types
//! are swapped for injected components: `html` and `body` render their
//! children, `head` renders nothing.

use nob_router::ConventionFile;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static WRAPPER_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(_?jsxs?|_?jsxDEV|createElement)\(\s*["'](html|body|head)["']"#)
        .expect("wrapper regex is valid")
});

const PRELUDE: &str = "\
const __nob_html = (props) => props.children;
const __nob_body = (props) => props.children;
const __nob_head = () => null;
";

/// Whether `path` is a wrapper module (file stem `layout`).
pub fn is_wrapper(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(ConventionFile::from_file_name)
        == Some(ConventionFile::Layout)
}

/// Redirect document-level element calls to the injected substitutes.
///
/// Returns the input unchanged when nothing matches.
pub fn rewrite(code: &str) -> String {
    if !WRAPPER_CALL_RE.is_match(code) {
        return code.to_string();
    }

    let replaced = WRAPPER_CALL_RE.replace_all(code, "$1(__nob_$2");
    let insert_at = end_of_imports(&replaced);

    let mut out = String::with_capacity(replaced.len() + PRELUDE.len());
    out.push_str(&replaced[..insert_at]);
    out.push_str(PRELUDE);
    out.push_str(&replaced[insert_at..]);
    out
}

/// Byte offset just past the leading block of import statements.
fn end_of_imports(code: &str) -> usize {
    let mut offset = 0;
    let mut end = 0;
    let mut in_import = false;

    for line in code.split_inclusive('\n') {
        let trimmed = line.trim();
        offset += line.len();

        if in_import {
            if trimmed.ends_with(';') {
                in_import = false;
                end = offset;
            }
            continue;
        }

        if trimmed.starts_with("import ") || trimmed.starts_with("import{") {
            if trimmed.ends_with(';') {
                end = offset;
            } else {
                in_import = true;
            }
        } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wrapper() {
        assert!(is_wrapper(Path::new("/p/app/layout.tsx")));
        assert!(is_wrapper(Path::new("/p/app/blog/layout.js")));
        assert!(!is_wrapper(Path::new("/p/app/page.tsx")));
        assert!(!is_wrapper(Path::new("/p/components/layout-grid.tsx")));
    }

    #[test]
    fn test_redirects_document_elements() {
        let code = concat!(
            "import { jsx as _jsx, jsxs as _jsxs } from \"react/jsx-runtime\";\n",
            "export default function RootLayout({ children }) {\n",
            "\treturn _jsxs(\"html\", { lang: \"en\", children: [_jsx(\"head\", {}), ",
            "_jsx(\"body\", { children })] });\n",
            "}\n",
        );
        let out = rewrite(code);

        assert!(out.contains("_jsxs(__nob_html, {"));
        assert!(out.contains("_jsx(__nob_head, {})"));
        assert!(out.contains("_jsx(__nob_body, {"));
        assert!(!out.contains("\"html\""));
    }

    #[test]
    fn test_prelude_follows_imports() {
        let code = concat!(
            "import { jsx as _jsx } from \"react/jsx-runtime\";\n",
            "import Nav from \"/components/Nav.tsx\";\n",
            "export default () => _jsx(\"body\", {});\n",
        );
        let out = rewrite(code);

        let prelude = out.find("const __nob_html").unwrap();
        assert!(prelude > out.find("import Nav").unwrap());
        assert!(prelude < out.find("export default").unwrap());
    }

    #[test]
    fn test_prelude_without_imports_goes_first() {
        let out = rewrite("export default () => createElement('head', null);\n");
        assert!(out.starts_with("const __nob_html"));
        assert!(out.contains("createElement(__nob_head, null)"));
    }

    #[test]
    fn test_other_elements_untouched() {
        let code = "import { jsx as _jsx } from \"react/jsx-runtime\";\nexport default () => _jsx(\"div\", {});\n";
        assert_eq!(rewrite(code), code);
    }

    #[test]
    fn test_multiline_import_block() {
        let code = concat!(
            "import {\n",
            "  a,\n",
            "  b\n",
            "} from \"x\";\n",
            "export default () => _jsx(\"html\", {});\n",
        );
        let out = rewrite(code);
        assert!(out.find("const __nob_html").unwrap() > out.find("from \"x\";").unwrap());
    }
}
