//! `spacemap show`: print the schema held in a state file.

use anyhow::{Context, Result};
use spacemap_store::{MemoryStore, SchemaStore, Space};
use std::path::PathBuf;

use super::error::HelpfulError;
use super::output::print_space;

#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    /// Schema state file
    #[arg(long)]
    pub state: PathBuf,

    /// Only this space
    #[arg(long)]
    pub space: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let store = MemoryStore::load(&args.state)
        .with_context(|| format!("Failed to load state {}", args.state.display()))?;

    let spaces: Vec<&Space> = match &args.space {
        Some(name) => {
            let space = store
                .space(name)
                .map_err(|_| HelpfulError::space_not_found(name, &args.state))?;
            vec![space]
        }
        None => store.spaces(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "spaces": spaces }))?);
        return Ok(());
    }

    if spaces.is_empty() {
        println!("No spaces in {}.", args.state.display());
        return Ok(());
    }
    for space in spaces {
        print_space(space);
    }
    Ok(())
}
