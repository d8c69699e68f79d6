//! Gerrit data source
//!
//! The analyzer only needs two queries from the review server, abstracted
//! behind [`ChangeSource`] so the cycle can run against a mock in tests.

mod client;
mod payload;

pub use client::GerritService;
pub use payload::{RawAccount, RawChange, RawLabel, RawRevision, RawVote};

use crate::error::Result;
use crate::types::ChangeNumber;
use async_trait::async_trait;

/// Source of change data for one polling cycle
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Fetch open changes that carry Code-Review+2 and Verified+1
    ///
    /// Each element of the list is decoded on its own; an element that does
    /// not decode comes back as `Error::MalformedRecord` in its slot. A failure
    /// of the query itself is reported as `Error::DataSourceUnavailable`.
    async fn query_candidates(&self) -> Result<Vec<Result<RawChange>>>;

    /// Fetch the changes that must be submitted together with `number`
    ///
    /// The result may include the change itself. Failures are reported as
    /// `Error::DependencyQuery`.
    async fn submitted_together(&self, number: ChangeNumber) -> Result<Vec<RawChange>>;
}
