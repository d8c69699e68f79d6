//! Report sinks
//!
//! HTML rendering lives outside this crate; the file sink writes the
//! structured report as JSON for it, plus a plain-text summary.

use crate::error::{Error, Result};
use crate::report::{Category, CategoryReport, Report};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Filename of the plain-text summary
pub const TEXT_REPORT_FILE: &str = "mergeable_changes.txt";

/// Filename of the structured JSON report
pub const JSON_REPORT_FILE: &str = "mergeable_changes.json";

/// Destination for a finished report
pub trait ReportSink: Send + Sync {
    /// Store or publish `report`
    fn write(&self, report: &Report) -> Result<()>;
}

/// Writes the text summary and JSON report into a directory
#[derive(Debug, Clone)]
pub struct FileReportSink {
    output_dir: PathBuf,
    refresh: Option<Duration>,
}

impl FileReportSink {
    /// Create a sink writing into `output_dir`.
    ///
    /// `refresh` is mentioned in the text header so readers know how stale
    /// the file may be.
    pub fn new(output_dir: impl Into<PathBuf>, refresh: Option<Duration>) -> Self {
        Self {
            output_dir: output_dir.into(),
            refresh,
        }
    }

    /// Directory the report files go to
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// A file written next to its target, waiting to be renamed into place.
///
/// The temporary file is removed on drop unless it was committed.
struct StagedFile {
    tmp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedFile {
    fn write(target: PathBuf, content: &str) -> Result<Self> {
        let mut tmp = target.as_os_str().to_owned();
        tmp.push(".tmp");
        let staged = Self {
            tmp: PathBuf::from(tmp),
            target,
            committed: false,
        };
        fs::write(&staged.tmp, content).map_err(|e| {
            Error::Report(format!("failed to write {}: {e}", staged.tmp.display()))
        })?;
        Ok(staged)
    }

    fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.target).map_err(|e| {
            Error::Report(format!("failed to replace {}: {e}", self.target.display()))
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}

impl ReportSink for FileReportSink {
    fn write(&self, report: &Report) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).map_err(|e| {
                Error::Report(format!(
                    "failed to create {}: {e}",
                    self.output_dir.display()
                ))
            })?;
        }

        // Both files are staged before either is replaced
        let json = serde_json::to_string_pretty(report)?;
        let json = StagedFile::write(self.output_dir.join(JSON_REPORT_FILE), &json)?;
        let text = StagedFile::write(
            self.output_dir.join(TEXT_REPORT_FILE),
            &render_text(report, self.refresh),
        )?;
        json.commit()?;
        text.commit()
    }
}

fn column_headers(category: Category) -> Vec<&'static str> {
    let mut headers = vec!["Number", "Subject", "Owner", "URL", "Age"];
    match category {
        Category::NeedsApproval => headers.push("Reviewed by"),
        Category::BlockedByParent => headers.push("Blocked by"),
        _ => {}
    }
    headers
}

fn render_table(out: &mut String, section: &CategoryReport) {
    let headers = column_headers(section.category);
    let rows: Vec<Vec<String>> = section
        .changes
        .iter()
        .map(|c| {
            let mut row = vec![
                c.number.to_string(),
                c.subject.clone(),
                c.owner.clone(),
                c.url.clone(),
                c.age.clone(),
            ];
            row.extend(c.reviewed_by.clone());
            row.extend(c.blocked_by.clone());
            row
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = widths.iter().fold(String::from("+"), |mut line, w| {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
        line
    });
    let format_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (cell, &width) in cells.iter().zip(&widths) {
            let _ = write!(line, " {cell:<width$} |");
        }
        line
    };

    let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();
    let _ = writeln!(out, "{border}");
    let _ = writeln!(out, "{}", format_row(&header_cells));
    let _ = writeln!(out, "{border}");
    for row in &rows {
        let _ = writeln!(out, "{}", format_row(row));
    }
    let _ = writeln!(out, "{border}");
}

/// Render the plain-text summary of a report
pub fn render_text(report: &Report, refresh: Option<Duration>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Generated at {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(refresh) = refresh {
        let minutes = refresh.as_secs() / 60;
        if minutes > 0 {
            let _ = writeln!(out, "Contents are re-generated every {minutes} minutes.");
        } else {
            let _ = writeln!(
                out,
                "Contents are re-generated every {} seconds.",
                refresh.as_secs()
            );
        }
    }
    out.push_str("\n\n");

    for section in &report.categories {
        let _ = writeln!(out, "{}", section.title);
        let _ = writeln!(out, "{}", "-".repeat(section.title.len()));
        if section.changes.is_empty() {
            out.push_str("No changes in this category.\n\n");
        } else {
            render_table(&mut out, section);
            out.push('\n');
        }
    }

    out
}
