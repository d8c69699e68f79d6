//! Change analysis for one polling cycle
//!
//! Two-phase pattern matching the rest of the crate:
//! 1. Build - turn raw payloads into typed [`ChangeRecord`]s (pure)
//! 2. Resolve - gather "submitted together" series (effectful, one query
//!    per ready change), then demote changes whose series contains a
//!    non-ready change (pure, testable)
//!
//! [`ChangeRecord`]: crate::types::ChangeRecord

mod builder;
mod resolve;

pub use builder::{build_change, build_change_set, parse_gerrit_timestamp, placeholder_blocker};
pub use resolve::{
    ResolutionSummary, SeriesQuery, gather_series, resolve_blockers, resolve_dependencies,
};
