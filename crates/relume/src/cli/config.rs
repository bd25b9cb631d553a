//! The `relume config` command: inspect and bootstrap pipeline settings.

use clap::{Args, Subcommand};
use relume_core::Config;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the active configuration as TOML
    Show {
        /// Print the built-in defaults instead of the loaded file
        #[arg(long)]
        defaults: bool,
    },

    /// Print the config file path
    Path,

    /// Write a config file with the default enhancement settings
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { defaults } => {
            let config = if defaults {
                Config::default()
            } else {
                Config::load()?
            };
            print!("{}", config.to_toml()?);
        }

        ConfigCommand::Path => {
            println!("{}", Config::default_path().display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {} (use --force to replace it)",
                    path.display()
                );
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, Config::default().to_toml()?)?;

            println!("Wrote default enhancement settings to {}", path.display());
            println!("Tune [filters] and [encode] there to change the output look.");
        }
    }

    Ok(())
}
