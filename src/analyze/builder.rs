//! Building typed change records from raw Gerrit payloads

use crate::error::{Error, Result};
use crate::gerrit::{RawChange, RawVote};
use crate::types::{BlockingChange, ChangeRecord, ChangeSet};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use tracing::warn;

/// Vote value that counts as an approval
const APPROVAL_VALUE: i32 = 2;

/// Gerrit timestamp layout (UTC, nanosecond fraction)
const GERRIT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Owner shown when the payload carries no owner name
const UNKNOWN_OWNER: &str = "Unknown";

/// Parse a Gerrit timestamp such as `2024-08-01 10:00:00.000000000`
pub fn parse_gerrit_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), GERRIT_TIMESTAMP_FORMAT)
        .ok()
        .map(|t| t.and_utc())
}

fn voter_name(vote: &RawVote) -> Option<String> {
    vote.name.clone().or_else(|| vote.username.clone())
}

/// Creation time of the change's first revision.
///
/// Gerrit returns revisions as a map keyed by commit SHA, so "first" is
/// taken as the earliest upload time rather than map order.
fn first_revision_created(raw: &RawChange, number: u64) -> Result<DateTime<Utc>> {
    let mut earliest: Option<DateTime<Utc>> = None;
    for revision in raw.revisions.values() {
        let Some(created) = revision.created.as_deref() else {
            continue;
        };
        let parsed = parse_gerrit_timestamp(created).ok_or_else(|| Error::MalformedRecord {
            number: Some(number),
            reason: format!("unparsable revision timestamp '{created}'"),
        })?;
        earliest = Some(earliest.map_or(parsed, |e| e.min(parsed)));
    }

    earliest.ok_or_else(|| Error::MalformedRecord {
        number: Some(number),
        reason: "no revision timestamp".to_string(),
    })
}

/// Build a [`ChangeRecord`] from a candidate change payload.
///
/// `now` is the reference time of the whole cycle, so ages across the
/// batch are comparable.
pub fn build_change(raw: &RawChange, now: DateTime<Utc>) -> Result<ChangeRecord> {
    let number = raw.number.ok_or_else(|| Error::MalformedRecord {
        number: None,
        reason: "missing _number".to_string(),
    })?;
    let project = raw.project.clone().ok_or_else(|| Error::MalformedRecord {
        number: Some(number),
        reason: "missing project".to_string(),
    })?;
    let created_at = first_revision_created(raw, number)?;

    let votes = raw.code_review_votes();
    let approvals: Vec<&RawVote> = votes
        .iter()
        .filter(|v| v.value == Some(APPROVAL_VALUE))
        .collect();
    let rejections = votes
        .iter()
        .filter(|v| v.value.is_some_and(|value| value < 0))
        .count();

    let has_rejection = rejections > 0;
    let has_merge_conflict = raw.mergeable == Some(false);
    let is_submittable = raw.submittable.unwrap_or(false);
    let needs_final_approval = !has_rejection && !has_merge_conflict && approvals.len() == 1;
    let reviewed_by = match approvals.as_slice() {
        [only] => voter_name(only),
        _ => None,
    };

    Ok(ChangeRecord {
        number,
        project,
        subject: raw.subject.clone().unwrap_or_default(),
        owner: raw
            .owner
            .as_ref()
            .and_then(|o| o.display_name())
            .unwrap_or(UNKNOWN_OWNER)
            .to_string(),
        created_at,
        age: (now - created_at).max(TimeDelta::zero()),
        has_rejection,
        has_merge_conflict,
        needs_final_approval,
        is_submittable,
        reviewed_by,
        ready: is_submittable && !has_rejection && !has_merge_conflict,
        blocked_by: None,
    })
}

/// Build the cycle's [`ChangeSet`] from the candidate query result.
///
/// Malformed records are logged and returned alongside the set instead of
/// failing the batch. Duplicate numbers keep the first occurrence.
pub fn build_change_set(raws: &[RawChange], now: DateTime<Utc>) -> (ChangeSet, Vec<Error>) {
    let mut set = ChangeSet::new();
    let mut skipped = Vec::new();

    for raw in raws {
        match build_change(raw, now) {
            Ok(record) => {
                let number = record.number;
                if !set.insert(record) {
                    warn!(change = number, "duplicate change in query result, keeping first");
                }
            }
            Err(e) => {
                warn!(change = ?raw.number, error = %e, "skipping malformed change");
                skipped.push(e);
            }
        }
    }

    (set, skipped)
}

/// Placeholder blocker for a series member that is not a candidate change.
///
/// Such a change exists on the server but lacks the required approval or
/// verification, so it always counts as not ready. Returns `None` when the
/// member carries no change number.
pub fn placeholder_blocker(raw: &RawChange, fallback_project: &str) -> Option<BlockingChange> {
    Some(BlockingChange {
        number: raw.number?,
        project: raw
            .project
            .clone()
            .unwrap_or_else(|| fallback_project.to_string()),
        subject: raw.subject.clone().unwrap_or_default(),
        placeholder: true,
    })
}
