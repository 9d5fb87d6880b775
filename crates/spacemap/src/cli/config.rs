//! Configuration paths and the mapper config file
//!
//! All paths live under `$SPACEMAP_HOME` (default `~/.spacemap`).
//!
//! ```toml
//! entity_postfix = "Entity"
//! repository_postfix = "Repository"
//! bootstrap = true
//! nested_set = false
//! ```

use anyhow::{Context, Result};
use spacemap_schema::MapperConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::HelpfulError;

pub use spacemap_logging::{logs_dir, spacemap_home};

/// Get the default config file: ~/.spacemap/config.toml
pub fn default_config_path() -> PathBuf {
    spacemap_home().join("config.toml")
}

/// Ensure the logs directory exists
pub fn ensure_logs_dir() -> std::io::Result<PathBuf> {
    let dir = logs_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Load mapper settings.
///
/// An explicit path must exist; the default path is optional.
pub fn load_mapper_config(explicit: Option<&Path>) -> Result<MapperConfig> {
    let path = match explicit {
        Some(path) if !path.exists() => return Err(HelpfulError::config_not_found(path).into()),
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(MapperConfig::default());
            }
            path
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: MapperConfig = toml::from_str(&raw)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    debug!(path = %path.display(), ?config, "Loaded config");
    Ok(config)
}

#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved paths in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command - shows paths and effective mapper settings
pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    let home = spacemap_home();
    let config_file = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let logs = logs_dir();
    let mapper = load_mapper_config(config_path)?;

    if args.json {
        let payload = serde_json::json!({
            "home": home.to_string_lossy(),
            "config": {
                "path": config_file.to_string_lossy(),
                "exists": config_file.exists(),
            },
            "logs": logs.to_string_lossy(),
            "mapper": mapper,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("spacemap configuration");
    println!();
    println!("Home:      {}", home.display());
    println!(
        "Config:    {} ({})",
        config_file.display(),
        if config_file.exists() { "found" } else { "not found" }
    );
    println!("Logs:      {}", logs.display());
    println!();
    println!("Entity postfix:     {}", mapper.entity_postfix.as_deref().unwrap_or("-"));
    println!("Repository postfix: {}", mapper.repository_postfix.as_deref().unwrap_or("-"));
    println!("Bootstrap:          {}", mapper.bootstrap);
    println!("Nested sets:        {}", mapper.nested_set);
    Ok(())
}
