//! `brtools build-info` command

use anyhow::{bail, Context, Result};

use crate::cli::BuildInfoArgs;
use brtools::GlobalContext;

pub async fn execute(ctx: &GlobalContext, args: BuildInfoArgs) -> Result<()> {
    let file = ctx.absolute(&args.file);
    let resolver = ctx.build_info_resolver();

    let Some(info) = resolver.resolve(&file).await else {
        bail!(
            "{} does not belong to a project\n\
             help: pass the folder containing the project with --workspace",
            file.display()
        );
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&info)
    } else {
        serde_json::to_string(&info)
    }
    .context("failed to serialize build info")?;
    println!("{}", json);

    resolver.registry().projects().await.dispose();
    Ok(())
}
