//! Relume CLI - Priority-driven image enhancement pipeline.
//!
//! Relume fetches product photos, runs them through a fixed enhancement
//! filter stack, and writes high-quality JPEG output.
//!
//! # Usage
//!
//! ```bash
//! # Enhance a single image and save it
//! relume enhance https://cdn.example.com/amp.jpg --output amp.jpg
//!
//! # Batch: first URL runs at high priority, the rest at normal
//! relume enhance https://cdn.example.com/a.jpg https://cdn.example.com/b.jpg
//!
//! # View configuration
//! relume config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Relume - Priority-driven image enhancement pipeline.
#[derive(Parser, Debug)]
#[command(name = "relume")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, enhance, and save images
    Enhance(cli::enhance::EnhanceArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match relume_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `relume config path`."
            );
            relume_core::Config::default()
        }
    };
    logging::init_from_config(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Relume v{}", relume_core::VERSION);

    match cli.command {
        Commands::Enhance(args) => cli::enhance::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
