//! Development server with live reload via Server-Sent Events.
//!
//! Source modules are transformed on request and cached by the pipeline;
//! everything else is read straight from the project root.

use crate::dev::shell::{CLIENT_SCRIPT_PATH, RELOAD_SCRIPT_PATH};
use crate::dev::{DevConfig, SharedState};
use crate::error::{CliError, Result};
use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::get,
};
use futures::Stream;
use nob_router::SOURCE_EXTENSIONS;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// Extensions served through the transform pipeline.
pub const MODULE_EXTENSIONS: [&str; 5] = ["ts", "tsx", "js", "jsx", "mjs"];

const NO_CACHE: &str = "no-cache";

/// Development server.
pub struct DevServer {
    /// Server configuration
    config: DevConfig,
    /// Shared application state
    state: SharedState,
}

impl DevServer {
    /// Create a new development server.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `state` - Shared state for transforms, routes and reload sessions
    pub fn new(config: DevConfig, state: SharedState) -> Self {
        Self { config, state }
    }

    /// Bind the configured address.
    ///
    /// # Errors
    ///
    /// Returns error if the address is taken or not available
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.addr;
        TcpListener::bind(addr)
            .await
            .map_err(|e| CliError::Server(format!("Failed to bind to {}: {}", addr, e)))
    }

    /// Serve requests on `listener` until the process stops.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = build_router(self.state);

        axum::serve(listener, app)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }

    /// Bind and serve.
    pub async fn start(self) -> Result<()> {
        let listener = self.bind().await?;
        crate::ui::success(&format!(
            "Development server running at {}",
            self.config.server_url()
        ));
        self.serve(listener).await
    }
}

/// Build the axum router with all routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        // Route manifest for the client navigator
        .route("/__routes", get(handle_routes))
        // SSE endpoint for reload events
        .route("/__reload", get(handle_reload_stream))
        // Reload client and browser navigator scripts
        .route(RELOAD_SCRIPT_PATH, get(handle_reload_script))
        .route(CLIENT_SCRIPT_PATH, get(handle_client_script))
        .route("/favicon.ico", get(handle_favicon))
        // Modules, static files and the page shell
        .fallback(handle_request)
        .layer(middleware::from_fn(log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Serve the route manifest.
async fn handle_routes(State(state): State<SharedState>) -> Response {
    match state.routes().to_manifest().to_json() {
        Ok(json) => (
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, NO_CACHE),
            ],
            json,
        )
            .into_response(),
        Err(e) => {
            error!("failed to serialize route manifest: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to serialize routes").into_response()
        }
    }
}

/// Unregisters a live-reload session when its stream is dropped.
struct SessionGuard {
    state: SharedState,
    id: usize,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.state.sessions.unregister(self.id) {
            info!(session = self.id, "live-reload session disconnected");
        }
    }
}

/// Handle SSE connections for reload events.
///
/// The first event is always the `connected` message with the current
/// version.
async fn handle_reload_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, mut rx) = state.sessions.register();
    let connected = state.connected_message().to_json();
    info!(session = id, "live-reload session connected");

    let guard = SessionGuard {
        state: Arc::clone(&state),
        id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().data(connected));
        while let Some(message) = rx.recv().await {
            yield Ok(Event::default().data(message));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// Serve the reload client script.
async fn handle_reload_script() -> Response {
    const RELOAD_SCRIPT: &str = include_str!("../../assets/reload-client.js");
    script(RELOAD_SCRIPT)
}

/// Serve the browser navigator.
async fn handle_client_script() -> Response {
    const CLIENT_SCRIPT: &str = include_str!("../../assets/client.js");
    script(CLIENT_SCRIPT)
}

fn script(source: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, NO_CACHE),
        ],
        source,
    )
        .into_response()
}

/// Serve a project favicon if there is one, 204 otherwise.
async fn handle_favicon(State(state): State<SharedState>) -> Response {
    for candidate in [
        state.root().join("favicon.ico"),
        state.public_dir().join("favicon.ico"),
    ] {
        if let Some(response) = serve_static(&candidate).await {
            return response;
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Handle all other requests.
async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    let Some(local) = state.local_path(path) else {
        return not_found();
    };
    let ext = request_extension(path);

    match ext {
        Some(ext) if MODULE_EXTENSIONS.contains(&ext) => {
            return serve_module(&state, &local).await;
        }
        None if state.is_module_root(path) => {
            return match resolve_extensionless(&local).await {
                Some(file) => serve_module(&state, &file).await,
                None => not_found(),
            };
        }
        _ => {}
    }

    if path.starts_with(state.public_prefix()) {
        if let Some(response) = serve_static(&local).await {
            return response;
        }
    }

    if ext == Some("css") {
        return serve_static(&local).await.unwrap_or_else(not_found);
    }

    if ext.is_none() || ext == Some("html") {
        return html(state.shell().to_string());
    }

    serve_static(&local).await.unwrap_or_else(not_found)
}

/// Transform a source module and respond with JavaScript.
async fn serve_module(state: &SharedState, path: &Path) -> Response {
    match state.pipeline.transform(path).await {
        Ok(code) => (
            [
                (header::CONTENT_TYPE, "application/javascript"),
                (header::CACHE_CONTROL, NO_CACHE),
            ],
            code.to_string(),
        )
            .into_response(),
        Err(e) if e.is_not_found() => not_found(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Transform error: {}", e),
        )
            .into_response(),
    }
}

/// Find the file an extensionless module request refers to: `base.<ext>`
/// first, then `base/index.<ext>`.
async fn resolve_extensionless(base: &Path) -> Option<PathBuf> {
    let file_name = base.file_name()?.to_string_lossy().into_owned();

    let candidates = SOURCE_EXTENSIONS
        .iter()
        .map(|ext| base.with_file_name(format!("{}.{}", file_name, ext)))
        .chain(
            SOURCE_EXTENSIONS
                .iter()
                .map(|ext| base.join(format!("index.{}", ext))),
        );

    for candidate in candidates {
        if is_file(&candidate).await {
            return Some(candidate);
        }
    }
    None
}

/// Serve a file from disk, or `None` if it isn't a readable file.
async fn serve_static(path: &Path) -> Option<Response> {
    if !is_file(path).await {
        return None;
    }

    match tokio::fs::read(path).await {
        Ok(content) => Some(
            (
                [
                    (header::CONTENT_TYPE, determine_content_type(path)),
                    (header::CACHE_CONTROL, NO_CACHE),
                ],
                content,
            )
                .into_response(),
        ),
        Err(e) => {
            warn!("Failed to read file {}: {}", path.display(), e);
            None
        }
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

fn html(body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, NO_CACHE),
        ],
        body,
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not found",
    )
        .into_response()
}

/// Extension of the last path segment, if it has one.
fn request_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Determine MIME type from file extension.
fn determine_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") | Some("map") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_extension() {
        assert_eq!(request_extension("/app/page.tsx"), Some("tsx"));
        assert_eq!(request_extension("/styles/site.css"), Some("css"));
        assert_eq!(request_extension("/blog/hello"), None);
        assert_eq!(request_extension("/"), None);
        assert_eq!(request_extension("/v1.2/docs"), None);
        assert_eq!(request_extension("/.env"), None);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(
            determine_content_type(Path::new("public/logo.svg")),
            "image/svg+xml"
        );
        assert_eq!(
            determine_content_type(Path::new("lib/util.mjs")),
            "application/javascript"
        );
        assert_eq!(
            determine_content_type(Path::new("data.bin")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_resolve_extensionless() {
        let temp = tempfile::TempDir::new().unwrap();
        let components = temp.path().join("components");
        std::fs::create_dir_all(components.join("Nav")).unwrap();
        std::fs::write(components.join("Button.tsx"), "").unwrap();
        std::fs::write(components.join("Nav/index.ts"), "").unwrap();

        assert_eq!(
            resolve_extensionless(&components.join("Button")).await,
            Some(components.join("Button.tsx"))
        );
        assert_eq!(
            resolve_extensionless(&components.join("Nav")).await,
            Some(components.join("Nav/index.ts"))
        );
        assert_eq!(resolve_extensionless(&components.join("Missing")).await, None);
    }
}
