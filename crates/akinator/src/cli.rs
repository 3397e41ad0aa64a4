//! Command-line interface for the akinator client.

use clap::{Parser, Subcommand};

/// Akinator - play the guessing game from a terminal
#[derive(Parser, Debug)]
#[command(name = "akinator")]
#[command(about = "Play the Akinator guessing game from a terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game
    Play {
        /// Language code or name (e.g. "en", "french"); overrides the config
        #[arg(short, long)]
        region: Option<String>,
    },

    /// List the supported regions and their endpoints
    Regions,
}
