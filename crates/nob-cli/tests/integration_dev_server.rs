//! Integration tests for the development server.
//!
//! Requests go through the real axum router with `tower::ServiceExt::oneshot`,
//! against a small project written to a temp directory.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::StreamExt;
use nob_cli::config::NobConfig;
use nob_cli::dev::{DevServerState, FileChange, SharedState, build_router};
use nob_client::{LoadError, NavState, Navigator, NavigatorHost, Resolution, version_marker};
use nob_router::RouteManifest;
use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{Duration, timeout};
use tower::ServiceExt;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> (TempDir, SharedState) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    write(
        root,
        "app/layout.tsx",
        "export default function Layout({ children }: { children: unknown }) { return <main>{children}</main>; }",
    );
    write(
        root,
        "app/page.tsx",
        "import { Button } from \"@/components/Button\";\nexport default function Home() { return <Button label=\"hi\" />; }",
    );
    write(
        root,
        "app/blog/[slug]/page.tsx",
        "export default function Post({ params }: { params: { slug: string } }) { return <h1>{params.slug}</h1>; }",
    );
    write(root, "app/not-found.tsx", "export default () => <p>Missing</p>;");
    write(
        root,
        "components/Button.tsx",
        "export function Button({ label }: { label: string }) { return <button>{label}</button>; }",
    );
    write(root, "components/Nav/index.ts", "export const links: string[] = [];");
    write(root, "styles/site.css", "body { margin: 0; }");
    write(root, "public/robots.txt", "User-agent: *");

    let state = Arc::new(DevServerState::new(&NobConfig::for_root(root)));
    (temp, state)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_routes_endpoint_serves_manifest() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/__routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");

    let table = RouteManifest::from_json(&body).unwrap().into_table().unwrap();
    assert_eq!(table.len(), 2);

    let matched = table.match_path("/blog/hello").unwrap();
    assert_eq!(matched.params.get("slug").map(String::as_str), Some("hello"));
    assert_eq!(matched.route.page_path, "/app/blog/[slug]/page.tsx");
    assert_eq!(matched.route.layout_paths, ["/app/layout.tsx"]);
    assert!(table.not_found_for("/nope").is_some());
}

#[tokio::test]
async fn test_module_is_transformed() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/app/page.tsx?v=123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");
    assert!(body.contains("react/jsx-runtime"));
    assert!(body.contains("\"/components/Button.tsx\""));
    assert!(!body.contains("@/components"));
    assert!(!body.contains(": string"));
}

#[tokio::test]
async fn test_second_request_hits_cache() {
    let (temp, state) = project();
    let app = build_router(Arc::clone(&state));

    get(&app, "/components/Button.tsx").await;
    assert!(state.pipeline.contains(&temp.path().join("components/Button.tsx")));

    let (status, _, _) = get(&app, "/components/Button.tsx").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.pipeline.len(), 1);
}

#[tokio::test]
async fn test_missing_module_is_404() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, _, body) = get(&app, "/app/missing.tsx").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not found");
}

#[tokio::test]
async fn test_syntax_error_is_500() {
    let (temp, state) = project();
    write(temp.path(), "app/broken.tsx", "export default function ( {");
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/app/broken.tsx").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.starts_with("text/plain"));
    assert!(body.starts_with("Transform error:"));
}

#[tokio::test]
async fn test_parent_segments_are_rejected() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, _, _) = get(&app, "/app/../../etc/passwd").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_extensionless_module_resolution() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/components/Button").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");
    assert!(body.contains("Button"));

    let (status, _, body) = get(&app, "/components/Nav").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("links"));

    let (status, _, _) = get(&app, "/components/Missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_requests_get_the_shell() {
    let (_temp, state) = project();
    let app = build_router(state);

    for uri in ["/", "/blog/hello", "/index.html", "/does/not/exist"] {
        let (status, content_type, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert!(content_type.starts_with("text/html"), "{uri}");
        assert!(body.contains(r#"<script type="importmap">"#));
        assert!(body.contains("/__nob/reload.js"));
        assert!(body.contains(r#"<script type="module" src="/__nob/client.js">"#));
    }
}

#[tokio::test]
async fn test_static_files() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/styles/site.css").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/css"));
    assert_eq!(body, "body { margin: 0; }");

    let (status, _, _) = get(&app, "/styles/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, content_type, body) = get(&app, "/public/robots.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, "User-agent: *");

    let (status, _, _) = get(&app, "/data.bin").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favicon() {
    let (temp, state) = project();
    let app = build_router(state);

    let (status, _, _) = get(&app, "/favicon.ico").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    write(temp.path(), "public/favicon.ico", "icon");
    let (status, content_type, _) = get(&app, "/favicon.ico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "image/x-icon");
}

#[tokio::test]
async fn test_reload_script_is_served() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/__nob/reload.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");
    assert!(body.contains("/__reload"));
}

#[tokio::test]
async fn test_client_script_is_served() {
    let (_temp, state) = project();
    let app = build_router(state);

    let (status, content_type, body) = get(&app, "/__nob/client.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/javascript");

    // Talks to the manifest endpoint and handles reloads in place
    assert!(body.contains(r#"fetch("/__routes""#));
    assert!(body.contains(r#"addEventListener("nob:reload""#));
    assert!(body.contains("event.preventDefault();\n    reload(event.detail.version);"));
    assert!(body.contains("v=${version}"));

    // The module it imports from is resolvable through the default import map
    let (_, _, shell) = get(&app, "/").await;
    assert!(shell.contains(r#""react-dom/client""#));
}

#[tokio::test]
async fn test_reload_stream_sends_connected_then_reload() {
    let (_temp, state) = project();
    let app = build_router(Arc::clone(&state));

    let response = app
        .oneshot(Request::builder().uri("/__reload").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let mut body = response.into_body().into_data_stream();
    let first = timeout(Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let first = String::from_utf8_lossy(&first).into_owned();
    assert!(first.contains(r#""type":"connected""#), "{first}");
    assert!(first.contains(&format!(r#""version":{}"#, state.clock.current())));
    assert_eq!(state.sessions.len(), 1);

    let version = state.dispatch_reload("/app/page.tsx");
    let next = timeout(Duration::from_secs(5), body.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let next = String::from_utf8_lossy(&next).into_owned();
    assert!(next.contains(r#""type":"reload""#), "{next}");
    assert!(next.contains(&format!(r#""version":{version}"#)));
    assert!(next.contains(r#""file":"/app/page.tsx""#));

    drop(body);
    assert_eq!(state.sessions.len(), 0);
}

#[tokio::test]
async fn test_change_evicts_and_rescans() {
    let (temp, state) = project();
    let app = build_router(Arc::clone(&state));
    let button = temp.path().join("components/Button.tsx");

    get(&app, "/components/Button.tsx").await;
    assert!(state.pipeline.contains(&button));

    let file = state.apply_change(&FileChange::Modified(button.clone())).await;
    assert_eq!(file, "/components/Button.tsx");
    assert!(!state.pipeline.contains(&button));

    write(temp.path(), "app/about/page.tsx", "export default () => null;");
    state
        .apply_change(&FileChange::Created(temp.path().join("app/about/page.tsx")))
        .await;
    let (_, _, body) = get(&app, "/__routes").await;
    assert!(body.contains(r#""pattern": "/about""#));
}

/// Navigator host that talks to the dev server router in-process.
#[derive(Clone)]
struct RouterHost {
    app: Router,
    loaded: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl NavigatorHost for RouterHost {
    type Module = String;

    async fn fetch_manifest(&self) -> Result<RouteManifest, LoadError> {
        let (status, _, body) = get(&self.app, "/__routes").await;
        if status != StatusCode::OK {
            return Err(LoadError::Manifest(status.to_string()));
        }
        RouteManifest::from_json(&body).map_err(|e| LoadError::Manifest(e.to_string()))
    }

    async fn load_module(&self, url: &str) -> Result<String, LoadError> {
        let (status, _, _) = get(&self.app, url).await;
        self.loaded.lock().push(url.to_string());
        if status == StatusCode::OK {
            Ok(url.to_string())
        } else {
            Err(LoadError::module(url, status.to_string()))
        }
    }

    fn push_history(&self, _href: &str) {}
}

#[tokio::test]
async fn test_navigator_reload_uses_new_version() {
    let (temp, state) = project();
    let host = RouterHost {
        app: build_router(Arc::clone(&state)),
        loaded: Arc::default(),
    };
    let loaded = Arc::clone(&host.loaded);

    let navigator = Navigator::new(host, state.clock.current());
    assert_eq!(navigator.mount("/blog/hello").await.unwrap(), Resolution::Applied);
    assert!(matches!(navigator.state(), NavState::Rendered { .. }));

    let before = loaded.lock().clone();
    assert!(before.contains(&navigator.module_url("/app/blog/[slug]/page.tsx")));
    assert!(before.iter().all(|url| navigator.is_current(url)));

    write(
        temp.path(),
        "app/blog/[slug]/page.tsx",
        "export default function Post() { return <h2>edited</h2>; }",
    );
    let file = state
        .apply_change(&FileChange::Modified(
            temp.path().join("app/blog/[slug]/page.tsx"),
        ))
        .await;
    let version = state.dispatch_reload(&file);

    loaded.lock().clear();
    assert_eq!(navigator.reload(version).await.unwrap(), Resolution::Applied);
    assert_eq!(navigator.version(), version);

    let after = loaded.lock().clone();
    assert!(!after.is_empty());
    assert!(after.iter().all(|url| version_marker(url) == Some(version)));
    assert!(!navigator.is_current(&before[0]));
}

#[tokio::test]
async fn test_navigator_unknown_path_uses_not_found_boundary() {
    let (_temp, state) = project();
    let host = RouterHost {
        app: build_router(Arc::clone(&state)),
        loaded: Arc::default(),
    };

    let navigator = Navigator::new(host, state.clock.current());
    navigator.mount("/nope").await.unwrap();
    match navigator.state() {
        NavState::NotFound { tree, .. } => assert!(tree.is_some()),
        other => panic!("expected not found, got {other:?}"),
    }
}
