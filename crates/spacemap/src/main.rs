//! spacemap launcher
//!
//! Reconciles a JSON manifest of entity/repository declarations against a
//! schema state file.

use anyhow::Result;
use clap::{Parser, Subcommand};
use spacemap_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "spacemap", version, about = "Declared model to live schema reconciliation")]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: $SPACEMAP_HOME/config.toml)
    #[arg(long, global = true, env = "SPACEMAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bring a state file in line with a declaration manifest
    Migrate(cli::migrate::MigrateArgs),

    /// Seed the sequence/property bookkeeping spaces only
    Bootstrap(cli::bootstrap::BootstrapArgs),

    /// Show spaces, properties and indexes of a state file
    Show(cli::show::ShowArgs),

    /// Show resolved paths and mapper settings
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Migrate(args) => args.json,
        Commands::Bootstrap(args) => args.json,
        Commands::Show(args) => args.json,
        Commands::Config { json } => *json,
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Migrate(args) => cli::migrate::run(args, config_path),
        Commands::Bootstrap(args) => cli::bootstrap::run(args),
        Commands::Show(args) => cli::show::run(args),
        Commands::Config { json } => cli::config::run(cli::config::ConfigArgs { json }, config_path),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let log_dir = match cli::config::ensure_logs_dir() {
        Ok(dir) => Some(dir),
        Err(err) => {
            eprintln!("Warning: failed to create logs directory: {}", err);
            None
        }
    };
    if let Err(err) = init_logging(LogConfig {
        app_name: "spacemap",
        verbose: cli.verbose,
        log_dir,
    }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::from(1)
        }
    }
}
