//! Shared command context for CLI commands
//!
//! Extracts the setup shared by serve and once.

use crate::cli::GlobalArgs;
use mergeable_changes::config::{Config, ConfigOverrides};
use mergeable_changes::error::Result;
use mergeable_changes::gerrit::GerritService;
use mergeable_changes::report::FileReportSink;

/// Shared context for CLI commands
///
/// - Resolving the configuration (file, environment, flags)
/// - Creating the Gerrit service
/// - Creating the report sink
pub struct CommandContext {
    /// Resolved configuration
    pub config: Config,
    /// Gerrit data source
    pub source: GerritService,
    /// Where reports are written
    pub sink: FileReportSink,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let file = args
            .config
            .as_deref()
            .map(ConfigOverrides::load)
            .transpose()?;
        let config = Config::resolve(file, args.overrides())?;

        let source = GerritService::new(&config.gerrit_url, &config.project)?;
        let sink = FileReportSink::new(&config.output_dir, Some(config.interval));

        Ok(Self {
            config,
            source,
            sink,
        })
    }
}
