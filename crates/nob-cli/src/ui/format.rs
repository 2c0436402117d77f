//! Formatting utilities for durations and the route table.

use console::Term;
use nob_router::RouteTable;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use nob_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Plain-text listing of a route table, one route per line, in match order.
///
/// Each line is `pattern  page  [flags]` where the flags name the boundaries
/// attached to the route.
pub fn format_route_table(table: &RouteTable) -> String {
    let width = table
        .routes()
        .iter()
        .map(|route| route.pattern_str().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for route in table.routes() {
        let mut flags = Vec::new();
        if !route.layout_paths.is_empty() {
            flags.push(format!("layouts:{}", route.layout_paths.len()));
        }
        if route.loading_path.is_some() {
            flags.push("loading".to_string());
        }
        if route.error_path.is_some() {
            flags.push("error".to_string());
        }
        if route.not_found_path.is_some() {
            flags.push("not-found".to_string());
        }

        out.push_str(&format!(
            "{:width$}  {}",
            route.pattern_str(),
            route.page_path,
            width = width
        ));
        if !flags.is_empty() {
            out.push_str(&format!("  [{}]", flags.join(", ")));
        }
        out.push('\n');
    }
    out
}

/// Print the route table to stderr with a header and footer.
pub fn print_route_table(table: &RouteTable) {
    let term = Term::stderr();
    let width = (term.size().1 as usize).min(80);

    eprintln!("\n{}", "Routes".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for line in format_route_table(table).lines() {
        eprintln!("  {} {}", "▸".blue(), line);
    }

    eprintln!("{}", "─".repeat(width));
    eprintln!(
        "  {} {} routes, {} not-found boundaries",
        "Total:".bold(),
        table.len().green(),
        table.not_found_boundaries().len()
    );
}
