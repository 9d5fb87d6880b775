//! `spacemap bootstrap`: seed the bookkeeping spaces of a state file.

use anyhow::{Context, Result};
use spacemap_schema::{Bootstrap, CatalogStore, Meta, Migration};
use spacemap_store::MemoryStore;
use std::path::PathBuf;

use super::output::print_report;

#[derive(Debug, clap::Args)]
pub struct BootstrapArgs {
    /// Schema state file (created if missing)
    #[arg(long)]
    pub state: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: BootstrapArgs) -> Result<()> {
    let store = MemoryStore::load(&args.state)
        .with_context(|| format!("Failed to load state {}", args.state.display()))?;
    let mut store = CatalogStore::new(store);

    let mut meta = Meta::new(&mut store);
    Bootstrap.migrate(&mut meta)?;
    let report = meta.into_report();

    if !report.is_empty() {
        store
            .inner()
            .save(&args.state)
            .with_context(|| format!("Failed to save state {}", args.state.display()))?;
    }

    if args.json {
        let payload = serde_json::json!({
            "state": args.state,
            "seeded": !report.is_empty(),
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_report(&report);
    }
    Ok(())
}
