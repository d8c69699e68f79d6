//! Command-line interface

mod context;
mod once;
mod serve;

pub use context::CommandContext;
pub use once::run_once;
pub use serve::run_serve;

use clap::{Args, Parser, Subcommand};
use mergeable_changes::config::ConfigOverrides;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Reports which approved Gerrit changes are ready to merge
#[derive(Debug, Parser)]
#[command(name = "mergeable-changes", version, about)]
pub struct Cli {
    /// Settings shared by all commands
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Command to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings shared by all commands
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// TOML config file
    #[arg(long, global = true, env = "MERGEABLE_CHANGES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Gerrit base URL
    #[arg(long, global = true, env = "GERRIT_BASE_URL")]
    pub gerrit_url: Option<String>,

    /// Gerrit project to analyze
    #[arg(long, global = true, env = "GERRIT_PROJECT")]
    pub project: Option<String>,

    /// Directory for the report files
    #[arg(long, global = true, env = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Seconds between the end of one cycle and the start of the next
    #[arg(long, global = true, env = "POLL_INTERVAL_SECS")]
    pub interval: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl GlobalArgs {
    /// Command-line / environment settings as config overrides
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gerrit_url: self.gerrit_url.clone(),
            project: self.project.clone(),
            output_dir: self.output_dir.clone(),
            interval_secs: self.interval,
            log_level: self.log_level.as_ref().map(|l| l.to_lowercase()),
        }
    }
}

/// Available commands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Commands {
    /// Poll Gerrit and rewrite the report every interval
    Serve,
    /// Run a single cycle, write the report and print the summary
    Once,
}

/// Install the tracing subscriber; `RUST_LOG` overrides `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
