//! `brtools toolchains` command

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::ToolchainsArgs;
use brtools::util::{RealFileSystem, SystemProcessRunner};
use brtools::GlobalContext;

pub async fn execute(ctx: &GlobalContext, args: ToolchainsArgs) -> Result<()> {
    let catalog = ctx.toolchain_catalog(Arc::new(RealFileSystem), Arc::new(SystemProcessRunner));
    let installations = catalog.installations().await;

    if args.json {
        let json = serde_json::to_string_pretty(installations.as_slice())
            .context("failed to serialize toolchains")?;
        println!("{}", json);
        return Ok(());
    }

    if installations.is_empty() {
        let roots: Vec<String> = catalog
            .roots()
            .iter()
            .map(|r| r.display().to_string())
            .collect();
        println!("No Automation Studio installations found in [{}]", roots.join(", "));
        return Ok(());
    }

    for studio in installations.iter() {
        println!(
            "Automation Studio {} ({})",
            studio.version,
            studio.root_path.display()
        );
        for gcc in studio.gcc_executables() {
            println!(
                "  gcc {} {} [{}] {}",
                gcc.version,
                gcc.machine,
                gcc.target,
                gcc.path.display()
            );
        }
    }

    Ok(())
}
