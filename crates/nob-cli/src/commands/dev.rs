//! Development server command implementation.
//!
//! Orchestrates the dev server lifecycle:
//! - Route discovery
//! - File watching feeding the reload loop
//! - HTTP server with SSE for live reload
//! - Graceful shutdown on Ctrl+C

use crate::cli::DevArgs;
use crate::dev::{DevConfig, DevServer, DevServerState, FileWatcher, run_reload_loop};
use crate::error::Result;
use crate::ui;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;

/// Execute the dev command.
///
/// # Process Flow
///
/// 1. Load and validate configuration, pick a free port
/// 2. Discover routes and build the shared state
/// 3. Start the file watcher and the reload loop
/// 4. Bind and start the HTTP server
/// 5. Wait for Ctrl+C or the server to stop
///
/// # Errors
///
/// Returns errors for invalid configuration, watcher failures and a server
/// that cannot bind
pub async fn execute(args: DevArgs) -> Result<()> {
    let started = Instant::now();
    ui::info("Starting development server...");

    let config = DevConfig::from_args(&args)?;
    ui::info(&format!("Project root: {}", config.config.root.display()));

    let state = Arc::new(DevServerState::new(&config.config));
    crate::ui::print_route_table(&state.routes());

    let (watcher, change_rx) =
        FileWatcher::new(config.config.watch_roots(), config.config.ignore_patterns())?;
    for root in watcher.roots() {
        ui::debug(&format!("Watching {}", root.display()));
    }
    tokio::spawn(run_reload_loop(
        Arc::clone(&state),
        change_rx,
        config.debounce(),
    ));

    let server = DevServer::new(config.clone(), Arc::clone(&state));
    let listener = server.bind().await?;
    ui::success(&format!(
        "Development server running at {} (ready in {})",
        config.server_url(),
        ui::format_duration(started.elapsed())
    ));

    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve(listener).await {
            ui::error(&format!("Server error: {}", e));
        }
    });

    if config.open {
        open_browser(&config.server_url());
    }

    ui::info("Press Ctrl+C to stop");

    tokio::select! {
        _ = signal::ctrl_c() => {
            ui::info("Shutting down development server...");
        }
        _ = &mut server_handle => {
            ui::warning("Server task completed unexpectedly");
        }
    }

    drop(watcher);
    Ok(())
}

/// Open the default browser at `url`.
fn open_browser(url: &str) {
    use std::process::Command;

    let result = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", url]).spawn()
    } else {
        Command::new("xdg-open").arg(url).spawn()
    };

    match result {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
