//! HTML shell served for page requests.

use crate::config::NobConfig;
use serde_json::json;

/// URL the live-reload client script is served at.
pub const RELOAD_SCRIPT_PATH: &str = "/__nob/reload.js";

/// URL of the built-in browser navigator, the default bootstrap module.
pub const CLIENT_SCRIPT_PATH: &str = "/__nob/client.js";

/// Render the page shell: the import map, a mount point, the bootstrap
/// module and the live-reload client.
pub fn render_shell(config: &NobConfig) -> String {
    let import_map = serde_json::to_string_pretty(&json!({ "imports": config.import_map }))
        .unwrap_or_else(|_| "{}".to_string())
        // Keep the map from closing its own script element.
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <script type="importmap">
{import_map}
  </script>
  <script type="module" src="{reload}"></script>
</head>
<body>
  <div id="root"></div>
  <script type="module" src="{bootstrap}"></script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        import_map = import_map,
        reload = RELOAD_SCRIPT_PATH,
        bootstrap = escape_html(&config.bootstrap),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
