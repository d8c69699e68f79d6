//! Service configuration
//!
//! Values come from built-in defaults, an optional TOML file, and the
//! command line / environment, in increasing order of precedence.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Gerrit server
pub const DEFAULT_GERRIT_URL: &str = "https://review.spdk.io";

/// Default project whose changes are analyzed
pub const DEFAULT_PROJECT: &str = "spdk/spdk";

/// Default report directory
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

/// Default polling interval in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default log level when `RUST_LOG` is unset
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gerrit base URL, without trailing slash
    pub gerrit_url: String,
    /// Project to query (e.g. `spdk/spdk`)
    pub project: String,
    /// Directory the report files are written to
    pub output_dir: PathBuf,
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// Log level directive used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gerrit_url: DEFAULT_GERRIT_URL.to_string(),
            project: DEFAULT_PROJECT.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Settings that may appear in the TOML config file
///
/// Also used for command-line / environment overrides, where `None` means
/// "not given".
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Gerrit base URL
    pub gerrit_url: Option<String>,
    /// Project to query
    pub project: Option<String>,
    /// Report directory
    pub output_dir: Option<PathBuf>,
    /// Polling interval in seconds
    pub interval_secs: Option<u64>,
    /// Log level
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    /// Parse overrides from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("invalid config: {e}")))
    }

    /// Load overrides from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    fn apply(self, config: &mut Config) {
        if let Some(url) = self.gerrit_url {
            config.gerrit_url = url;
        }
        if let Some(project) = self.project {
            config.project = project;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(secs) = self.interval_secs {
            config.interval = Duration::from_secs(secs);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

impl Config {
    /// Resolve the configuration from file settings and command-line overrides.
    ///
    /// `cli` wins over `file`, which wins over the defaults.
    pub fn resolve(file: Option<ConfigOverrides>, cli: ConfigOverrides) -> Result<Self> {
        let mut config = Self::default();
        if let Some(file) = file {
            file.apply(&mut config);
        }
        cli.apply(&mut config);
        config.validate()
    }

    fn validate(mut self) -> Result<Self> {
        let parsed = url::Url::parse(&self.gerrit_url)
            .map_err(|e| Error::Config(format!("invalid Gerrit URL '{}': {e}", self.gerrit_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Gerrit URL must be http(s), got '{}'",
                self.gerrit_url
            )));
        }
        self.gerrit_url = self.gerrit_url.trim_end_matches('/').to_string();

        if self.project.trim().is_empty() {
            return Err(Error::Config("project must not be empty".to_string()));
        }
        if self.interval.is_zero() {
            return Err(Error::Config(
                "polling interval must be at least 1 second".to_string(),
            ));
        }
        Ok(self)
    }
}
