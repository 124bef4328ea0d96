//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// brtools - inspect B&R Automation Studio projects and toolchains
#[derive(Parser)]
#[command(name = "brtools")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Folder to search for projects (repeatable, defaults to the current
    /// directory)
    #[arg(short, long = "workspace", value_name = "DIR", global = true)]
    pub workspaces: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the projects below the workspace folders
    Projects(ProjectsArgs),

    /// Show the project and unit owning a file
    Owner(OwnerArgs),

    /// Print the resolved C build information of a file as JSON
    BuildInfo(BuildInfoArgs),

    /// List installed Automation Studio versions and their compilers
    Toolchains(ToolchainsArgs),
}

#[derive(Args)]
pub struct ProjectsArgs {
    /// Also list the units of each project
    #[arg(long)]
    pub units: bool,
}

#[derive(Args)]
pub struct OwnerArgs {
    /// File or directory to look up
    pub path: PathBuf,
}

#[derive(Args)]
pub struct BuildInfoArgs {
    /// Source file to resolve
    pub file: PathBuf,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args)]
pub struct ToolchainsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
