//! Command-line interface, parsed with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// whatdoing - personal watch tracker server
#[derive(Parser)]
#[command(name = "whatdoing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default search path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a default config.toml in the current directory
    Init,

    /// Load and validate the configuration, then exit
    CheckConfig,
}
