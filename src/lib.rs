//! mergeable-changes: which approved Gerrit changes are really ready to merge
//!
//! Polls a Gerrit server for open changes carrying Code-Review+2 and
//! Verified+1, works out which of them can be merged now (taking
//! "submitted together" series into account), and writes a categorized
//! report.

pub mod analyze;
pub mod config;
pub mod error;
pub mod gerrit;
pub mod poll;
pub mod report;
pub mod types;

pub use error::{Error, Result};
