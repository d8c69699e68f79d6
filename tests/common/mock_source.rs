//! Mock change source for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use mergeable_changes::error::{Error, Result};
use mergeable_changes::gerrit::{ChangeSource, RawChange};
use mergeable_changes::report::{Report, ReportSink};
use mergeable_changes::types::ChangeNumber;
use std::collections::HashMap;
use std::sync::Mutex;

/// Simple mock change source
///
/// Features:
/// - Configurable candidate list and per-change series
/// - Call tracking for verification
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockChangeSource {
    candidates: Mutex<Vec<RawChange>>,
    undecodable: Mutex<Vec<Option<ChangeNumber>>>,
    series_responses: Mutex<HashMap<ChangeNumber, Vec<RawChange>>>,
    // Call tracking
    query_calls: Mutex<usize>,
    series_calls: Mutex<Vec<ChangeNumber>>,
    // Error injection
    error_on_query: Mutex<Option<String>>,
    series_errors: Mutex<HashMap<ChangeNumber, u16>>,
}

impl MockChangeSource {
    /// Create a mock returning `candidates` from the candidate query
    pub fn with_candidates(candidates: Vec<RawChange>) -> Self {
        let mock = Self::default();
        *mock.candidates.lock().unwrap() = candidates;
        mock
    }

    /// Set the `submitted_together` response for a change
    pub fn set_series(&self, number: ChangeNumber, series: Vec<RawChange>) {
        self.series_responses.lock().unwrap().insert(number, series);
    }

    /// Append a candidate that fails to decode
    pub fn add_undecodable(&self, number: Option<ChangeNumber>) {
        self.undecodable.lock().unwrap().push(number);
    }

    // === Error injection methods ===

    /// Make `query_candidates` fail
    pub fn fail_query(&self, msg: &str) {
        *self.error_on_query.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `submitted_together` fail for one change with an HTTP status
    pub fn fail_series(&self, number: ChangeNumber, status: u16) {
        self.series_errors.lock().unwrap().insert(number, status);
    }

    // === Call tracking ===

    /// Number of candidate queries made
    pub fn query_call_count(&self) -> usize {
        *self.query_calls.lock().unwrap()
    }

    /// Changes `submitted_together` was called for, in call order
    pub fn series_calls(&self) -> Vec<ChangeNumber> {
        self.series_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeSource for MockChangeSource {
    async fn query_candidates(&self) -> Result<Vec<Result<RawChange>>> {
        *self.query_calls.lock().unwrap() += 1;
        if let Some(msg) = self.error_on_query.lock().unwrap().clone() {
            return Err(Error::DataSourceUnavailable(msg));
        }
        let mut changes: Vec<Result<RawChange>> = self
            .candidates
            .lock()
            .unwrap()
            .iter()
            .cloned()
            .map(Ok)
            .collect();
        changes.extend(self.undecodable.lock().unwrap().iter().map(|&number| {
            Err(Error::MalformedRecord {
                number,
                reason: "undecodable payload: invalid type: string \"yes\", expected a boolean"
                    .to_string(),
            })
        }));
        Ok(changes)
    }

    async fn submitted_together(&self, number: ChangeNumber) -> Result<Vec<RawChange>> {
        self.series_calls.lock().unwrap().push(number);
        if let Some(status) = self.series_errors.lock().unwrap().get(&number).copied() {
            return Err(Error::DependencyQuery {
                number,
                message: format!("GET /changes/{number}/submitted_together returned {status}"),
                status: Some(status),
            });
        }
        Ok(self
            .series_responses
            .lock()
            .unwrap()
            .get(&number)
            .cloned()
            .unwrap_or_default())
    }
}

/// Report sink that keeps every report in memory
#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<Report>>,
    fail: Mutex<bool>,
}

impl RecordingSink {
    /// Make every write fail
    pub fn fail_writes(&self) {
        *self.fail.lock().unwrap() = true;
    }

    /// Reports written so far
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }
}

impl ReportSink for RecordingSink {
    fn write(&self, report: &Report) -> Result<()> {
        if *self.fail.lock().unwrap() {
            return Err(Error::Report("disk full".to_string()));
        }
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
