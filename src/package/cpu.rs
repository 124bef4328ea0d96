//! `Cpu.pkg`: the PLC module and its build settings.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{PackageError, PackageFile};
use crate::util::fs::{split_include_dirs, split_shell_args, FileSystem};
use crate::xml::XmlElement;

/// Build settings of one CPU.
#[derive(Debug, Clone)]
pub struct CpuPackage {
    pub package: PackageFile,
    /// `Configuration@ModuleId`
    pub module_id: Option<String>,
    /// `AutomationRuntime@Version`
    pub runtime_version: Option<String>,
    /// `Build@GccVersion`
    pub compiler_version: Option<String>,
    /// `Build@AdditionalBuildOptions`
    pub build_options: Vec<String>,
    /// `Build@AnsicAdditionalBuildOptions`
    pub ansic_build_options: Vec<String>,
    /// `Build@IecAdditionalBuildOptions`
    pub iec_build_options: Vec<String>,
    /// `Build@AnsicIncludeDirectories`, resolved against the project root
    pub include_directories: Vec<PathBuf>,
}

fn required(element: Option<&XmlElement>, attr: &str, what: &str, path: &Path) -> Option<String> {
    let value = element.and_then(|e| e.attr(attr)).map(str::to_string);
    if value.is_none() {
        warn!("{}: no {} declared", path.display(), what);
    }
    value
}

fn options(build: Option<&XmlElement>, attr: &str, path: &Path) -> Vec<String> {
    match build.and_then(|b| b.attr(attr)) {
        Some(value) => split_shell_args(value),
        None => {
            debug!("{}: no {}", path.display(), attr);
            Vec::new()
        }
    }
}

impl CpuPackage {
    pub fn from_package(package: PackageFile, project_root: &Path) -> Result<Self, PackageError> {
        package.expect_kind("Cpu")?;

        let path = package.path.clone();
        let root = &package.document.root;
        let configuration = root.child("Configuration");
        let runtime = configuration.and_then(|c| c.child("AutomationRuntime"));
        let build = configuration.and_then(|c| c.child("Build"));

        let module_id = required(configuration, "ModuleId", "module id", &path);
        let runtime_version = required(runtime, "Version", "runtime version", &path);
        let compiler_version = required(build, "GccVersion", "gcc version", &path);

        let include_directories = build
            .and_then(|b| b.attr("AnsicIncludeDirectories"))
            .map(|list| split_include_dirs(project_root, list))
            .unwrap_or_default();

        Ok(CpuPackage {
            module_id,
            runtime_version,
            compiler_version,
            build_options: options(build, "AdditionalBuildOptions", &path),
            ansic_build_options: options(build, "AnsicAdditionalBuildOptions", &path),
            iec_build_options: options(build, "IecAdditionalBuildOptions", &path),
            include_directories,
            package,
        })
    }

    pub async fn load(
        fs: &dyn FileSystem,
        path: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        let package = PackageFile::load(fs, path, project_root).await?;
        Self::from_package(package, project_root)
    }
}
