//! `brtools projects` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ProjectsArgs;
use brtools::util::RealFileSystem;
use brtools::GlobalContext;

pub async fn execute(ctx: &GlobalContext, args: ProjectsArgs) -> Result<()> {
    let registry = ctx.project_registry(Arc::new(RealFileSystem));
    let set = registry.projects().await;

    if set.is_empty() {
        println!("No projects found");
        return Ok(());
    }

    for project in set.projects() {
        println!(
            "{} ({})",
            project.name,
            project.project_file().display()
        );
        println!(
            "  working version: {}",
            project.working_version.as_deref().unwrap_or("-")
        );

        let active = project.active_configuration_name();
        for configuration in &project.configurations {
            let marker = if active.as_deref() == Some(configuration.name.as_str()) {
                "*"
            } else {
                " "
            };
            println!(
                "  {} {} [{}] {} gcc {}",
                marker,
                configuration.name,
                configuration.target_system,
                configuration.module_id.as_deref().unwrap_or("-"),
                configuration.compiler_version.as_deref().unwrap_or("-"),
            );
        }

        if args.units {
            for unit in &project.logical.units {
                println!(
                    "    {} {} ({}){}",
                    unit.kind,
                    unit.logical_path.display(),
                    unit.language,
                    if unit.is_reference { " reference" } else { "" }
                );
            }
        } else {
            println!("  {} unit(s)", project.logical.units.len());
        }
    }

    set.dispose();
    Ok(())
}
