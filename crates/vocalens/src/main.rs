//! Vocalens CLI - describe an image with a hosted vision model and read the
//! description aloud.
//!
//! # Usage
//!
//! ```bash
//! # Guided mode (on a terminal)
//! vocalens
//!
//! # Describe an image and synthesize speech with the "nova" voice
//! vocalens describe photo.jpg --voice nova --save-as ~/Desktop/photo.mp3
//!
//! # Check which models answer
//! vocalens probe
//!
//! # View configuration
//! vocalens config show
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

mod cli;
mod logging;

/// Vocalens - describe images and read the descriptions aloud.
#[derive(Parser, Debug)]
#[command(name = "vocalens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "VOCALENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Describe an image and synthesize the description as speech
    Describe(cli::describe::DescribeArgs),

    /// Check which vision and speech models are reachable
    Probe,

    /// List the available voices
    Voices,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // API keys may live in a .env file next to the invocation.
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) if cli.config.is_some() => return Err(e),
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `vocalens config path`."
            );
            vocalens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Vocalens v{}", vocalens_core::VERSION);
    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
    }

    match cli.command {
        Some(Commands::Describe(args)) => cli::describe::execute(args, config).await,
        Some(Commands::Probe) => cli::probe::execute(config).await,
        Some(Commands::Voices) => {
            cli::voices::execute(&config);
            Ok(())
        }
        Some(Commands::Config(args)) => cli::config::execute(args, cli.config.as_deref()).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            let config_path = cli::config::effective_path(cli.config.as_deref());
            cli::interactive::run(config, config_path).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<vocalens_core::Config> {
    let config = match path {
        Some(path) => vocalens_core::Config::load_from(path)?,
        None => vocalens_core::Config::load()?,
    };
    Ok(config)
}
