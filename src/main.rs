use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use gator::cli::{self, Cli};
use gator::config::Config;
use gator::storage::Database;

/// Get the config directory path (~/.config/gator/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("gator"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; cycle diagnostics are info/warn, so default to info
    // when RUST_LOG is unset.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Cli::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    let config_path = config_dir.join("config.toml");
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let db_path = config
        .db_path
        .clone()
        .unwrap_or_else(|| config_dir.join("gator.db"));
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = Database::open(db_path_str)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    cli::dispatch(args.command, &db, &mut config, &config_path).await
}
