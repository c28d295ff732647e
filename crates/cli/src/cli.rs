//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Blaster - budget-aware SMS vendor router
#[derive(Parser, Debug)]
#[command(
    name = "blaster",
    author,
    version,
    about = "Budget-aware SMS vendor router",
    long_about = "Routes outbound messages to delivery vendors.\n\n\
                  Each message type has an ordered vendor preference list; each vendor \n\
                  has a fixed budget of concurrent calls. Messages without capacity wait \n\
                  in a per-type retry queue until a vendor frees up."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BLASTER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BLASTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the router and push generated messages through it
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config/router.toml",
        env = "BLASTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Number of messages to generate
    #[arg(short = 'n', long, default_value = "100000", env = "BLASTER_MESSAGES")]
    pub messages: u64,

    /// Message types to cycle through, comma separated
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "otp",
        env = "BLASTER_MIX"
    )]
    pub mix: Vec<String>,

    /// Override the configured transport
    #[arg(long, value_enum, env = "BLASTER_TRANSPORT")]
    pub transport: Option<TransportKind>,

    /// Override the retry poll interval (milliseconds)
    #[arg(long, env = "BLASTER_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Override the per-call delivery timeout (milliseconds)
    #[arg(long, env = "BLASTER_DELIVERY_TIMEOUT_MS")]
    pub delivery_timeout_ms: Option<u64>,

    /// Stop generating after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "BLASTER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running the router
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BLASTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config/router.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/router.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show vendor details
    #[arg(long)]
    pub vendors: bool,

    /// Show preference lists
    #[arg(long)]
    pub preferences: bool,
}

/// Transport override
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportKind {
    /// HTTP GET against each vendor's locator
    Http,
    /// Log every call, always succeed
    Log,
    /// In-process mock vendor
    Mock,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
