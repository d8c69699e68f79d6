//! Shared test fixtures

pub mod mock_source;

pub use mock_source::{MockChangeSource, RecordingSink};

use chrono::{DateTime, Utc};
use mergeable_changes::analyze::parse_gerrit_timestamp;
use mergeable_changes::config::Config;
use mergeable_changes::gerrit::{RawAccount, RawChange, RawLabel, RawRevision, RawVote};
use std::collections::HashMap;

/// Fixed reference time for all scenario tests
pub fn reference_time() -> DateTime<Utc> {
    parse_gerrit_timestamp("2024-08-10 12:00:00.000000000").unwrap()
}

/// Config pointing at a fake server
pub fn test_config() -> Config {
    Config {
        gerrit_url: "https://review.example.com".to_string(),
        ..Config::default()
    }
}

/// A candidate change: submittable, mergeable, one +2 from "Reviewer One"
pub fn make_change(number: u64, created: &str) -> RawChange {
    let mut revisions = HashMap::new();
    revisions.insert(
        format!("{number:040x}"),
        RawRevision {
            number: Some(1),
            created: Some(created.to_string()),
        },
    );

    let mut change = RawChange {
        number: Some(number),
        project: Some("spdk/spdk".to_string()),
        subject: Some(format!("Change {number}")),
        owner: Some(RawAccount {
            account_id: Some(1000),
            name: Some("Jane Doe".to_string()),
            username: Some("jdoe".to_string()),
        }),
        created: Some(created.to_string()),
        mergeable: Some(true),
        submittable: Some(true),
        labels: HashMap::new(),
        revisions,
    };
    set_votes(&mut change, &[(2, "Reviewer One")]);
    change
}

/// Replace the Code-Review votes of `change`
pub fn set_votes(change: &mut RawChange, votes: &[(i32, &str)]) {
    let all = votes
        .iter()
        .map(|(value, name)| RawVote {
            value: Some(*value),
            name: Some((*name).to_string()),
            username: None,
        })
        .collect();
    change
        .labels
        .insert("Code-Review".to_string(), RawLabel { all });
}

/// A series member as returned by `submitted_together`
pub fn series_member(number: u64) -> RawChange {
    RawChange {
        number: Some(number),
        project: Some("spdk/spdk".to_string()),
        subject: Some(format!("Change {number}")),
        ..Default::default()
    }
}
