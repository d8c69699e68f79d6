//! Polling cycle and service loop
//!
//! Each cycle fetches candidates, builds a fresh change set, resolves
//! series blockers and aggregates the report. Nothing survives from one
//! cycle to the next.

use crate::analyze::{ResolutionSummary, build_change_set, resolve_dependencies};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::gerrit::ChangeSource;
use crate::report::{Report, ReportSink, build_report};
use chrono::{DateTime, Utc};
use std::future::Future;
use tracing::{error, info};

/// Outcome of one successful cycle
#[derive(Debug)]
pub struct CycleOutcome {
    /// The aggregated report
    pub report: Report,
    /// Number of candidate payloads fetched
    pub fetched: usize,
    /// Records skipped as undecodable or malformed
    pub skipped: Vec<Error>,
    /// What dependency resolution did
    pub resolution: ResolutionSummary,
}

/// Run one analysis cycle against `source`.
///
/// `now` is the reference time for every age in the batch and the
/// report's generation time. Only a failed candidate query fails the
/// cycle, as `Error::DataSourceUnavailable`.
pub async fn run_cycle(
    source: &dyn ChangeSource,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<CycleOutcome> {
    let fetched = source.query_candidates().await.map_err(|e| match e {
        Error::DataSourceUnavailable(_) => e,
        other => Error::DataSourceUnavailable(other.to_string()),
    })?;
    let fetched_count = fetched.len();

    let mut raws = Vec::with_capacity(fetched_count);
    let mut skipped = Vec::new();
    for item in fetched {
        match item {
            Ok(raw) => raws.push(raw),
            Err(e) => skipped.push(e),
        }
    }

    let (mut set, malformed) = build_change_set(&raws, now);
    skipped.extend(malformed);
    let resolution = resolve_dependencies(&mut set, source).await;
    let report = build_report(&set, &config.gerrit_url, now);

    info!(
        fetched = fetched_count,
        analyzed = set.len(),
        skipped = skipped.len(),
        ready = set.ready_numbers().len(),
        demoted = resolution.demoted.len(),
        series_failures = resolution.failed.len(),
        "cycle complete"
    );

    Ok(CycleOutcome {
        report,
        fetched: fetched_count,
        skipped,
        resolution,
    })
}

/// Run cycles until `shutdown` resolves. Returns the number of cycles started.
///
/// The next cycle starts `config.interval` after the previous one finished,
/// so cycles never overlap. Failed cycles and failed report writes are
/// logged and retried on the next interval.
pub async fn run_service(
    source: &dyn ChangeSource,
    sink: &dyn ReportSink,
    config: &Config,
    shutdown: impl Future<Output = ()>,
) -> u64 {
    let mut shutdown = std::pin::pin!(shutdown);
    let mut cycles = 0;

    loop {
        cycles += 1;
        let outcome = tokio::select! {
            () = &mut shutdown => {
                info!("shutdown requested during cycle");
                break;
            }
            outcome = run_cycle(source, config, Utc::now()) => outcome,
        };

        match outcome {
            Ok(outcome) => {
                if let Err(e) = sink.write(&outcome.report) {
                    error!(error = %e, "failed to write report");
                }
            }
            Err(e) => {
                error!(error = %e, "cycle aborted, retrying after interval");
            }
        }

        tokio::select! {
            () = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            () = tokio::time::sleep(config.interval) => {}
        }
    }

    cycles
}
