//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mentord - goal-tracking coach daemon
#[derive(Parser)]
#[command(
    name = "mentord",
    about = "Goal-tracking coach daemon with an LLM-interpreted chat loop",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send one message through the coach and print the reply
    Chat {
        /// The message text
        message: String,
    },

    /// List all tracked domains
    Domains,

    /// Reset every domain's progress to 0
    Reset,

    /// Show daemon mode and store statistics
    Status,
}
