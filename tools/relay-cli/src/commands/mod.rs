//! CLI command implementations.

pub mod config;
pub mod encode;
pub mod get;

use clap::{Args, Subcommand};

/// Arguments for the encode command.
#[derive(Args)]
pub struct EncodeArgs {
    /// Bearer credential forwarded to the origin.
    pub credential: String,

    /// Repository coordinate, e.g. `owner/repo`.
    pub coordinate: String,

    /// File path inside the repository; multiple values are joined with `/`.
    #[arg(required = true)]
    pub path: Vec<String>,

    /// Print a full URL on this relay host instead of a bare path.
    #[arg(long)]
    pub host: Option<String>,
}

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Relay path, as printed by `relay encode`.
    pub path: String,

    /// Host the inbound URL is attributed to (part of the cache key).
    #[arg(long, default_value = "http://localhost:3000")]
    pub host: String,

    /// Number of times to send the request through the relay.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub repeat: u32,

    /// Print response headers.
    #[arg(short, long)]
    pub include: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Write a default relay.toml in the current directory
    Init {
        /// Overwrite an existing file without asking.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}
