//! mergeable-changes CLI entry point

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match cli::CommandContext::new(&cli.global) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    cli::init_logging(&ctx.config.log_level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cli::run_serve(&ctx).await,
        Commands::Once => cli::run_once(&ctx).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
