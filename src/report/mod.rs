//! Report aggregation and output
//!
//! The aggregator turns the final change set into ordered categories;
//! sinks decide how that structured report is stored.

mod aggregate;
mod sink;

pub use aggregate::{Category, CategoryReport, ChangeSummary, Report, build_report, format_age};
pub use sink::{FileReportSink, JSON_REPORT_FILE, ReportSink, TEXT_REPORT_FILE, render_text};
