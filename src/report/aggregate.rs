//! Partitioning the analyzed change set into report categories

use crate::types::{ChangeNumber, ChangeRecord, ChangeSet};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::cmp::Reverse;

/// A report category
///
/// Categories are independent filters: a change that is not ready may
/// appear in several of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Ready to merge right now
    Ready,
    /// Has exactly one +2 and needs another
    NeedsApproval,
    /// Has a negative Code-Review vote
    HasRejection,
    /// Does not merge cleanly
    HasConflict,
    /// Waits on a non-ready change in its series
    BlockedByParent,
}

impl Category {
    /// All categories in report order
    pub const ALL: [Self; 5] = [
        Self::Ready,
        Self::NeedsApproval,
        Self::HasRejection,
        Self::HasConflict,
        Self::BlockedByParent,
    ];

    /// Section title shown in the report
    pub const fn title(self) -> &'static str {
        match self {
            Self::Ready => "Changes ready for merge",
            Self::NeedsApproval => "Changes needing another +2 CR vote",
            Self::HasRejection => "Changes with a -1 CR vote",
            Self::HasConflict => "Changes with a merge conflict",
            Self::BlockedByParent => "Changes blocked by parents in series",
        }
    }

    /// Whether `change` belongs to this category
    pub const fn contains(self, change: &ChangeRecord) -> bool {
        match self {
            Self::Ready => change.ready,
            Self::NeedsApproval => change.needs_final_approval,
            Self::HasRejection => change.has_rejection,
            Self::HasConflict => change.has_merge_conflict,
            Self::BlockedByParent => change.blocked_by.is_some(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// One row of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    /// Change number
    pub number: ChangeNumber,
    /// Subject line
    pub subject: String,
    /// Owner name
    pub owner: String,
    /// Web URL of the change
    pub url: String,
    /// Human-readable age, e.g. `3 days 4 hours`
    pub age: String,
    /// Age in whole seconds, for sorting on the consumer side
    pub age_seconds: i64,
    /// Sole +2 reviewer (`NeedsApproval` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    /// URL of the blocking change (`BlockedByParent` only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
}

/// One category with its ordered rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    /// Category
    pub category: Category,
    /// Section title
    pub title: &'static str,
    /// Rows, oldest change first
    pub changes: Vec<ChangeSummary>,
}

/// Structured report handed to the rendering step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// Categories in report order
    pub categories: Vec<CategoryReport>,
}

impl Report {
    /// Rows of one category
    pub fn category(&self, category: Category) -> &[ChangeSummary] {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.changes.as_slice())
            .unwrap_or_default()
    }

    /// Total number of rows across all categories
    pub fn row_count(&self) -> usize {
        self.categories.iter().map(|c| c.changes.len()).sum()
    }
}

/// Format an age as `"{days} days {hours} hours"`
pub fn format_age(age: TimeDelta) -> String {
    let days = age.num_days();
    let hours = (age - TimeDelta::days(days)).num_hours();
    format!("{days} days {hours} hours")
}

fn summarize(change: &ChangeRecord, category: Category, base_url: &str) -> ChangeSummary {
    ChangeSummary {
        number: change.number,
        subject: change.subject.clone(),
        owner: change.owner.clone(),
        url: change.url(base_url),
        age: format_age(change.age),
        age_seconds: change.age.num_seconds(),
        reviewed_by: (category == Category::NeedsApproval)
            .then(|| change.reviewed_by.clone().unwrap_or_else(|| "None".to_string())),
        blocked_by: if category == Category::BlockedByParent {
            change.blocked_by.as_ref().map(|b| b.url(base_url))
        } else {
            None
        },
    }
}

/// Build the report from the final change set.
///
/// Within each category, changes are ordered oldest first; equal ages keep
/// ascending change number.
pub fn build_report(set: &ChangeSet, base_url: &str, generated_at: DateTime<Utc>) -> Report {
    let categories = Category::ALL
        .into_iter()
        .map(|category| {
            let mut members: Vec<&ChangeRecord> =
                set.iter().filter(|c| category.contains(c)).collect();
            members.sort_by_key(|c| (Reverse(c.age), c.number));

            CategoryReport {
                category,
                title: category.title(),
                changes: members
                    .into_iter()
                    .map(|c| summarize(c, category, base_url))
                    .collect(),
            }
        })
        .collect();

    Report {
        generated_at,
        categories,
    }
}
