//! Dependency resolution over "submitted together" series
//!
//! A ready change is only really mergeable if every other change it has to
//! be submitted with is ready too. Gerrit computes the series transitively,
//! so one pass per ready change is enough.

use crate::analyze::builder::placeholder_blocker;
use crate::error::Result;
use crate::gerrit::{ChangeSource, RawChange};
use crate::types::{BlockingChange, ChangeNumber, ChangeSet};
use tracing::{debug, warn};

/// Result of the "submitted together" query for one ready change
#[derive(Debug)]
pub struct SeriesQuery {
    /// Change the series was queried for
    pub change: ChangeNumber,
    /// Series as returned by the server, or the query failure
    pub result: Result<Vec<RawChange>>,
}

/// What the resolver did in one cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Number of series examined
    pub examined: usize,
    /// Changes demoted because of a blocking series member
    pub demoted: Vec<ChangeNumber>,
    /// Changes whose series query failed and were left unchanged
    pub failed: Vec<ChangeNumber>,
}

/// Query the series of every change that is currently ready (EFFECTFUL).
///
/// Queries run one after another in fetch order. A failed query is kept
/// in the result rather than aborting the others.
pub async fn gather_series(set: &ChangeSet, source: &dyn ChangeSource) -> Vec<SeriesQuery> {
    let mut queries = Vec::new();
    for change in set.ready_numbers() {
        let result = source.submitted_together(change).await;
        queries.push(SeriesQuery { change, result });
    }
    queries
}

/// Find the first non-ready change in `series`, scanning from the end.
///
/// Gerrit lists descendants before their ancestors, so scanning in reverse
/// checks the closest-to-base ancestors first.
fn find_blocker(
    set: &ChangeSet,
    change: ChangeNumber,
    project: &str,
    series: &[RawChange],
) -> Option<BlockingChange> {
    for member in series.iter().rev() {
        let Some(number) = member.number else {
            warn!(change, "series member without change number, ignoring");
            continue;
        };
        if number == change {
            continue;
        }

        match set.get(number) {
            Some(parent) if parent.ready => {}
            Some(parent) => return Some(parent.as_blocker()),
            None => return placeholder_blocker(member, project),
        }
    }
    None
}

/// Demote ready changes whose series contains a non-ready change (PURE).
///
/// Queries are applied in the order given. Failed queries leave their
/// change untouched. Changes are only ever demoted, never promoted.
pub fn resolve_blockers(set: &mut ChangeSet, queries: Vec<SeriesQuery>) -> ResolutionSummary {
    let mut summary = ResolutionSummary::default();

    for SeriesQuery { change, result } in queries {
        let Some(record) = set.get(change) else {
            continue;
        };
        if !record.ready {
            continue;
        }
        let project = record.project.clone();

        let series = match result {
            Ok(series) => series,
            Err(e) => {
                warn!(
                    change,
                    error = %e,
                    permission_denied = e.is_permission_denied(),
                    "could not resolve series, leaving change as is"
                );
                summary.failed.push(change);
                continue;
            }
        };
        summary.examined += 1;

        let Some(blocker) = find_blocker(set, change, &project, &series) else {
            continue;
        };
        debug!(
            change,
            blocked_by = blocker.number,
            placeholder = blocker.placeholder,
            "change blocked by series member"
        );
        if let Some(record) = set.get_mut(change) {
            record.block(blocker);
            summary.demoted.push(change);
        }
    }

    summary
}

/// Gather series for all ready changes and resolve blockers.
pub async fn resolve_dependencies(
    set: &mut ChangeSet,
    source: &dyn ChangeSource,
) -> ResolutionSummary {
    let queries = gather_series(set, source).await;
    resolve_blockers(set, queries)
}
