//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// Opentribe view service
#[derive(Parser, Debug)]
#[command(name = "opentribe")]
#[command(version)]
#[command(about = "View-count deduplication service for the Opentribe marketplace", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Delete expired view records once and exit
    Cleanup,

    /// Print a sample configuration file
    ConfigGen {
        /// Write to this path instead of stdout
        output: Option<String>,
    },
}

impl Cli {
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
