//! Serve command - poll Gerrit and refresh the report every interval

use crate::cli::CommandContext;
use mergeable_changes::error::Result;
use mergeable_changes::poll::run_service;
use tracing::{info, warn};

/// Run the serve command until Ctrl-C
pub async fn run_serve(ctx: &CommandContext) -> Result<()> {
    info!(
        gerrit = %ctx.config.gerrit_url,
        project = %ctx.config.project,
        output_dir = %ctx.config.output_dir.display(),
        interval_secs = ctx.config.interval.as_secs(),
        "starting mergeable changes service"
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    };

    let cycles = run_service(&ctx.source, &ctx.sink, &ctx.config, shutdown).await;
    info!(cycles, "service stopped");
    Ok(())
}
