//! The `vocalens config` command for configuration management.

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use vocalens_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Subcommands for configuration management.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Show config file path
    Path,

    /// Initialize a new config file with defaults
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

/// The config file in effect: `--config` / `VOCALENS_CONFIG`, else the default.
pub fn effective_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::default_path)
}

/// Execute the config command. `override_path` is the global `--config` flag.
pub async fn execute(args: ConfigArgs, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = effective_path(override_path);

    match args.command {
        ConfigCommand::Show => {
            let config = if path.exists() {
                Config::load_from(&path)?
            } else {
                Config::default()
            };
            println!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            init(&path, force)?;
            tracing::info!("Config file created at: {}", path.display());
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn init(path: &PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, Config::default().to_toml()?)?;
    Ok(())
}
