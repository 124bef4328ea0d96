//! `brtools owner` command

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::cli::OwnerArgs;
use brtools::util::RealFileSystem;
use brtools::GlobalContext;

pub async fn execute(ctx: &GlobalContext, args: OwnerArgs) -> Result<()> {
    let path = ctx.absolute(&args.path);
    let registry = ctx.project_registry(Arc::new(RealFileSystem));

    let Some(project) = registry.owner_of(&path).await else {
        bail!("no project owns {}", path.display());
    };

    println!("project: {}", project.name);
    println!("file: {}", project.project_file().display());
    if let Some(unit) = project.unit_of(&path) {
        println!(
            "unit: {} ({} {})",
            unit.logical_path.display(),
            unit.language,
            unit.kind
        );
    }
    if let Some(configuration) = project.active_configuration() {
        println!("configuration: {}", configuration.name);
    }

    registry.projects().await.dispose();
    Ok(())
}
