//! Error types for mergeable-changes

use thiserror::Error;

/// Errors produced while polling Gerrit and building the report
#[derive(Error, Debug)]
pub enum Error {
    /// A fetched change is missing a field the analyzer needs
    #[error("malformed change record{}: {reason}", number_suffix(.number))]
    MalformedRecord {
        /// Change number, when the payload had one
        number: Option<u64>,
        /// What was missing or unparsable
        reason: String,
    },

    /// The "submitted together" query for one change failed
    #[error("submitted_together query for change {number} failed: {message}")]
    DependencyQuery {
        /// Change whose series could not be fetched
        number: u64,
        /// Underlying failure
        message: String,
        /// HTTP status, if the server answered
        status: Option<u16>,
    },

    /// The candidate change query failed; the whole cycle is skipped
    #[error("Gerrit data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Gerrit answered with an unexpected status or body
    #[error("Gerrit API error: {0}")]
    Gerrit(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Writing the report failed
    #[error("report error: {0}")]
    Report(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a series query rejected with 401/403.
    ///
    /// Gerrit refuses `submitted_together` when the series contains a change
    /// the caller cannot read (private changes, restricted branches).
    pub const fn is_permission_denied(&self) -> bool {
        matches!(
            self,
            Self::DependencyQuery {
                status: Some(401 | 403),
                ..
            }
        )
    }
}

fn number_suffix(number: &Option<u64>) -> String {
    number.map(|n| format!(" {n}")).unwrap_or_default()
}

/// Result type alias for mergeable-changes
pub type Result<T> = std::result::Result<T, Error>;
