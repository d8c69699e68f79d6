//! Once command - run a single cycle and print the summary

use crate::cli::CommandContext;
use anstream::println;
use chrono::Utc;
use mergeable_changes::error::Result;
use mergeable_changes::poll::run_cycle;
use mergeable_changes::report::{Report, ReportSink};
use owo_colors::OwoColorize;

/// Run the once command
pub async fn run_once(ctx: &CommandContext) -> Result<()> {
    let outcome = run_cycle(&ctx.source, &ctx.config, Utc::now()).await?;
    ctx.sink.write(&outcome.report)?;

    print_summary(&outcome.report);
    if !outcome.skipped.is_empty() {
        println!(
            "{}",
            format!("{} malformed change(s) skipped", outcome.skipped.len()).yellow()
        );
    }
    if !outcome.resolution.failed.is_empty() {
        println!(
            "{}",
            format!(
                "Series lookup failed for: {}",
                outcome
                    .resolution
                    .failed
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
            .yellow()
        );
    }
    println!(
        "{}",
        format!("Report written to {}", ctx.sink.output_dir().display()).dimmed()
    );
    Ok(())
}

/// Print each category with its changes, oldest first
fn print_summary(report: &Report) {
    for section in &report.categories {
        println!(
            "{} {}",
            section.title.bold(),
            format!("({})", section.changes.len()).dimmed()
        );
        if section.changes.is_empty() {
            println!("  {}", "No changes in this category.".dimmed());
        }
        for change in &section.changes {
            let mut line = format!(
                "  {} {} ({}, {})",
                change.number.cyan(),
                change.subject,
                change.owner,
                change.age
            );
            if let Some(reviewer) = &change.reviewed_by {
                line.push_str(&format!(" reviewed by {reviewer}"));
            }
            if let Some(blocker) = &change.blocked_by {
                line.push_str(&format!(" blocked by {blocker}"));
            }
            println!("{line}");
            println!("    {}", change.url.dimmed());
        }
        println!();
    }
}
