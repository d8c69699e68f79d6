//! Core types for mergeable-changes

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Gerrit change number (the numeric `_number`, unique per server)
pub type ChangeNumber = u64;

/// A change that keeps another change from being merged
///
/// Either a change from the current [`ChangeSet`] that is not ready, or a
/// placeholder for a series member that did not qualify as a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingChange {
    /// Change number
    pub number: ChangeNumber,
    /// Project the change belongs to
    pub project: String,
    /// Change subject
    pub subject: String,
    /// Whether this blocker was synthesized from a series member outside the candidate set
    pub placeholder: bool,
}

impl BlockingChange {
    /// Web URL of the blocking change
    pub fn url(&self, base_url: &str) -> String {
        change_url(base_url, &self.project, self.number)
    }
}

/// One open, approved change as analyzed in a single polling cycle
///
/// Review flags are computed once by the builder. Only the dependency
/// resolver touches `ready`, `needs_final_approval` and `blocked_by`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ChangeRecord {
    /// Change number
    pub number: ChangeNumber,
    /// Project (repository) name
    pub project: String,
    /// First line of the commit message
    pub subject: String,
    /// Display name of the change owner
    pub owner: String,
    /// Creation time of the first revision
    pub created_at: DateTime<Utc>,
    /// Age relative to the cycle's reference time
    pub age: TimeDelta,
    /// At least one negative Code-Review vote
    pub has_rejection: bool,
    /// Gerrit reports the change as not cleanly mergeable
    pub has_merge_conflict: bool,
    /// Exactly one +2, no rejection and no conflict
    pub needs_final_approval: bool,
    /// Gerrit's own submittable flag
    pub is_submittable: bool,
    /// Name of the sole +2 voter, if there is exactly one
    pub reviewed_by: Option<String>,
    /// Ready to merge after dependency resolution
    pub ready: bool,
    /// First non-ready change found earlier in the series
    pub blocked_by: Option<BlockingChange>,
}

impl ChangeRecord {
    /// Web URL of this change
    pub fn url(&self, base_url: &str) -> String {
        change_url(base_url, &self.project, self.number)
    }

    /// Snapshot of this change for use as another change's blocker
    pub fn as_blocker(&self) -> BlockingChange {
        BlockingChange {
            number: self.number,
            project: self.project.clone(),
            subject: self.subject.clone(),
            placeholder: false,
        }
    }

    /// Demote this change because of a blocking change in its series.
    ///
    /// Has no effect once a blocker has been recorded.
    pub fn block(&mut self, blocker: BlockingChange) {
        if self.blocked_by.is_some() {
            return;
        }
        self.ready = false;
        self.needs_final_approval = false;
        self.blocked_by = Some(blocker);
    }
}

/// Build the web URL of a change: `{base}/c/{project}/+/{number}`
pub fn change_url(base_url: &str, project: &str, number: ChangeNumber) -> String {
    format!("{}/c/{project}/+/{number}", base_url.trim_end_matches('/'))
}

/// All candidate changes of one polling cycle
///
/// Keeps fetch order for iteration and indexes records by number for the
/// lookups the resolver does. Rebuilt from scratch every cycle.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    records: Vec<ChangeRecord>,
    index: HashMap<ChangeNumber, usize>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, keeping the first one if the number is already present.
    ///
    /// Returns `false` for a duplicate.
    pub fn insert(&mut self, record: ChangeRecord) -> bool {
        if self.index.contains_key(&record.number) {
            return false;
        }
        self.index.insert(record.number, self.records.len());
        self.records.push(record);
        true
    }

    /// Look up a change by number
    pub fn get(&self, number: ChangeNumber) -> Option<&ChangeRecord> {
        self.index.get(&number).map(|&i| &self.records[i])
    }

    /// Look up a change by number, mutably
    pub fn get_mut(&mut self, number: ChangeNumber) -> Option<&mut ChangeRecord> {
        self.index.get(&number).map(|&i| &mut self.records[i])
    }

    /// Iterate records in fetch order
    pub fn iter(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    /// Numbers of changes currently marked ready, in fetch order
    pub fn ready_numbers(&self) -> Vec<ChangeNumber> {
        self.records
            .iter()
            .filter(|c| c.ready)
            .map(|c| c.number)
            .collect()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ChangeRecord> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = ChangeRecord>>(iter: I) -> Self {
        let mut set = Self::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
