//! Route listing command.

use crate::cli::RoutesArgs;
use crate::config::NobConfig;
use crate::error::Result;
use crate::ui;
use nob_router::discover;

/// Execute the routes command.
///
/// With `--json` the manifest served at `/__routes` goes to stdout;
/// otherwise a table is printed to stderr.
pub async fn execute(args: RoutesArgs) -> Result<()> {
    let config = NobConfig::load(&args.overrides(), args.project.config.as_deref())?;
    config.validate()?;

    let table = discover(&config.discovery());

    if args.json {
        println!("{}", table.to_manifest().to_json()?);
        return Ok(());
    }

    if table.is_empty() {
        ui::warning(&format!(
            "No routes found in {}. Add a page.tsx to get started.",
            config.app_path().display()
        ));
        return Ok(());
    }

    ui::print_route_table(&table);
    Ok(())
}
