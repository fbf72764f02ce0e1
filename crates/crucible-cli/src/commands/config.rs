//! `crucible config` - inspect and edit the TOML config file

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one config value
    Get {
        /// Config key name
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value ("none" clears optional keys)
        value: String,
    },
    /// Clear an optional value
    Unset {
        /// Config key name
        key: String,
    },
    /// List every key with its current value
    List,
    /// Show config file path
    Path,
    /// Write a config file with default values
    Init {
        /// Rule table to record in the new config
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub async fn run(args: &ConfigArgs) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(key),
        ConfigCommands::Set { key, value } => run_set(key, value),
        ConfigCommands::Unset { key } => run_set(key, "none"),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Init { rules, force } => run_init(rules.clone(), *force),
    }
}

fn run_get(key: &str) -> anyhow::Result<()> {
    if !Config::is_key(key) {
        anyhow::bail!(
            "Unknown config key: {} (available: {})",
            key,
            Config::keys().join(", ")
        );
    }
    // Unset optional keys print nothing
    if let Some(value) = Config::load().get(key) {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load();
    config.set(key, value)?;
    config.save()?;
    tracing::info!("Updated {} in {}", key, config_file_path().display());
    match config.get(key) {
        Some(value) => println!("{} = {}", key, value),
        None => println!("{} cleared", key),
    }
    Ok(())
}

fn run_list() -> anyhow::Result<()> {
    let config = Config::load();
    println!("# {}", config_file_path().display());
    for key in Config::keys() {
        match config.get(key) {
            Some(value) => println!("{} = {}", key, value),
            None => println!("# {} is not set", key),
        }
    }
    Ok(())
}

fn run_init(rules: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    let config = Config {
        rules_path: rules,
        ..Config::default()
    };
    config.save()?;
    println!("Created config file at {}", path.display());
    Ok(())
}
