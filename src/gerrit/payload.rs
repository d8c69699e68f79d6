//! Raw `ChangeInfo` payloads as returned by the Gerrit REST API
//!
//! Every field is optional so that one incomplete change does not fail the
//! decoding of a whole query result. Required fields are checked by the
//! change builder.

use serde::Deserialize;
use std::collections::HashMap;

/// A change as returned by `/changes/` and `/changes/{n}/submitted_together`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChange {
    /// Change number
    #[serde(rename = "_number")]
    pub number: Option<u64>,
    /// Project name
    pub project: Option<String>,
    /// Subject line
    pub subject: Option<String>,
    /// Change owner (needs `DETAILED_ACCOUNTS` for the name)
    pub owner: Option<RawAccount>,
    /// Change creation time
    pub created: Option<String>,
    /// Whether the change merges cleanly; absent when Gerrit did not compute it
    pub mergeable: Option<bool>,
    /// Whether Gerrit would allow submitting the change
    pub submittable: Option<bool>,
    /// Labels by name (needs `DETAILED_LABELS` for individual votes)
    #[serde(default)]
    pub labels: HashMap<String, RawLabel>,
    /// Revisions by commit SHA (needs `CURRENT_REVISION` or `ALL_REVISIONS`)
    #[serde(default)]
    pub revisions: HashMap<String, RawRevision>,
}

impl RawChange {
    /// Votes on the Code-Review label, empty if the label is missing
    pub fn code_review_votes(&self) -> &[RawVote] {
        self.labels
            .get(CODE_REVIEW_LABEL)
            .map(|label| label.all.as_slice())
            .unwrap_or_default()
    }
}

/// Name of the review label that carries approvals and rejections
pub const CODE_REVIEW_LABEL: &str = "Code-Review";

/// An account reference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAccount {
    /// Numeric account ID
    #[serde(rename = "_account_id")]
    pub account_id: Option<u64>,
    /// Display name
    pub name: Option<String>,
    /// Username
    pub username: Option<String>,
}

impl RawAccount {
    /// Best display name available for this account
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.username.as_deref())
    }
}

/// One label with its detailed votes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLabel {
    /// All votes, including zero votes from reviewers
    #[serde(default)]
    pub all: Vec<RawVote>,
}

/// A single reviewer vote
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVote {
    /// Vote value; absent for reviewers who have not voted
    pub value: Option<i32>,
    /// Voter display name
    pub name: Option<String>,
    /// Voter username
    pub username: Option<String>,
}

/// One revision (patch set) of a change
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRevision {
    /// Patch set number
    #[serde(rename = "_number")]
    pub number: Option<u64>,
    /// Upload time of the patch set
    pub created: Option<String>,
}
