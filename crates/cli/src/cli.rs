//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// RoadSense - pothole detection and recording pipeline
#[derive(Parser, Debug)]
#[command(
    name = "roadsense",
    author,
    version,
    about = "Road-surface recording and pothole detection pipeline",
    long_about = "Records accelerometer and gyroscope streams onto a fixed 100 Hz grid,\n\
                  calibrates the mount orientation from gravity, surfaces possible\n\
                  potholes for operator confirmation and exports the annotated\n\
                  session as CSV."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "ROADSENSE_VERBOSE")]
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
        env = "ROADSENSE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a session
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
    #[arg(short, long, default_value = "config.toml", env = "ROADSENSE_CONFIG")]
    pub config: PathBuf,

    /// Recording duration in seconds (0 = run until Ctrl+C)
    #[arg(long, default_value = "0", env = "ROADSENSE_DURATION")]
    pub duration: u64,

    /// Override the detection threshold from configuration (m/s²)
    #[arg(long, env = "ROADSENSE_THRESHOLD")]
    pub threshold: Option<f64>,

    /// How detection prompts are answered
    #[arg(long, value_enum, default_value = "ask", env = "ROADSENSE_RESPOND")]
    pub respond: RespondMode,

    /// Seconds before an unanswered prompt times out
    #[arg(long, default_value = "10", env = "ROADSENSE_PROMPT_TIMEOUT")]
    pub prompt_timeout: u64,

    /// Validate configuration and exit without recording
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = use configuration value)
    #[arg(long, default_value = "0", env = "ROADSENSE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// How detection prompts are answered
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RespondMode {
    /// Interactive y/n prompt on stdin
    Ask,
    /// Confirm every detection without asking
    Confirm,
    /// Reject every detection without asking
    Reject,
    /// Let every prompt time out
    Ignore,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detector tunables
    #[arg(long)]
    pub detector: bool,
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
