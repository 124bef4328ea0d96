//! brtools CLI - inspect B&R Automation Studio projects and toolchains

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use brtools::GlobalContext;
use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let default_filter = if cli.verbose {
        "brtools=debug"
    } else {
        "brtools=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let mut ctx = GlobalContext::new()?.with_workspace_folders(cli.workspaces);
    ctx.set_verbose(cli.verbose);

    // Execute command
    runtime.block_on(async {
        match cli.command {
            Commands::Projects(args) => commands::projects::execute(&ctx, args).await,
            Commands::Owner(args) => commands::owner::execute(&ctx, args).await,
            Commands::BuildInfo(args) => commands::build_info::execute(&ctx, args).await,
            Commands::Toolchains(args) => commands::toolchains::execute(&ctx, args).await,
        }
    })
}
