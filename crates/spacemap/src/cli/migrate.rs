//! `spacemap migrate`: reconcile a state file against a manifest.

use anyhow::{Context, Result};
use serde::Serialize;
use spacemap_schema::{DeclarationManifest, Mapper, MapperConfig, MigrationReport};
use spacemap_store::MemoryStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::config::load_mapper_config;
use super::error::HelpfulError;
use super::output::print_report;

#[derive(Debug, clap::Args)]
pub struct MigrateArgs {
    /// JSON manifest of entity/repository declarations
    #[arg(long)]
    pub manifest: PathBuf,

    /// Schema state file (created if missing)
    #[arg(long)]
    pub state: PathBuf,

    /// Suffix stripped from entity class names
    #[arg(long)]
    pub entity_postfix: Option<String>,

    /// Suffix stripped from repository class names
    #[arg(long)]
    pub repository_postfix: Option<String>,

    /// Skip seeding the sequence/property spaces
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Index nested-set tree spaces
    #[arg(long)]
    pub nested_set: bool,

    /// Compute changes without saving the state file
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct MigrateOutput<'a> {
    state: &'a Path,
    dry_run: bool,
    classes: usize,
    report: &'a MigrationReport,
}

/// Flags override the config file.
fn effective_config(args: &MigrateArgs, mut config: MapperConfig) -> MapperConfig {
    if args.entity_postfix.is_some() {
        config.entity_postfix = args.entity_postfix.clone();
    }
    if args.repository_postfix.is_some() {
        config.repository_postfix = args.repository_postfix.clone();
    }
    if args.no_bootstrap {
        config.bootstrap = false;
    }
    if args.nested_set {
        config.nested_set = true;
    }
    config
}

fn load_manifest(path: &Path) -> Result<DeclarationManifest> {
    if !path.exists() {
        return Err(HelpfulError::manifest_not_found(path).into());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    DeclarationManifest::from_json(&raw)
        .map_err(|err| HelpfulError::invalid_manifest(path, &err.to_string()).into())
}

pub fn run(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = effective_config(&args, load_mapper_config(config_path)?);
    let manifest = load_manifest(&args.manifest)?;
    let store = MemoryStore::load(&args.state)
        .with_context(|| format!("Failed to load state {}", args.state.display()))?;

    let mut mapper = Mapper::new(store, config)?;
    let declarations = manifest.into_declarations()?;
    let classes = declarations.len();
    for declaration in declarations {
        mapper.register(declaration)?;
    }

    // changes applied before a failure are kept and saved
    let outcome = mapper.migrate();

    if args.dry_run {
        info!(state = %args.state.display(), "Dry run, state not saved");
    } else {
        let saved = mapper
            .store()
            .save(&args.state)
            .with_context(|| format!("Failed to save state {}", args.state.display()));
        match (&outcome, saved) {
            (Ok(_), saved) => saved?,
            (Err(_), Ok(())) => {
                warn!(state = %args.state.display(), "Migration failed, partial changes saved")
            }
            (Err(_), Err(save_err)) => {
                warn!(error = %format!("{:#}", save_err), "Could not save partial changes")
            }
        }
    }

    let report = outcome?;

    if args.json {
        let output = MigrateOutput {
            state: &args.state,
            dry_run: args.dry_run,
            classes,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
        if args.dry_run {
            println!("Dry run: {} not modified.", args.state.display());
        }
    }
    Ok(())
}
