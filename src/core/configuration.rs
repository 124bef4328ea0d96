//! Configurations of the physical view.

use std::path::{Path, PathBuf};

use tracing::warn;

use super::paths::ProjectPaths;
use crate::package::{ConfigPackage, CpuPackage, PackageError, PackageObject, PhysicalPackage};
use crate::toolchain::TargetSystem;
use crate::util::fs::FileSystem;

/// One hardware configuration and the build settings of its CPU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Configuration directory below `Physical`
    pub root_path: PathBuf,
    pub name: String,
    pub description: Option<String>,
    /// Directory of the CPU
    pub cpu_path: PathBuf,
    /// PLC module id (`X20CP1586`, ...)
    pub module_id: Option<String>,
    /// Automation Runtime version
    pub runtime_version: Option<String>,
    /// Requested gcc version
    pub compiler_version: Option<String>,
    pub include_directories: Vec<PathBuf>,
    pub build_options: Vec<String>,
    pub ansic_build_options: Vec<String>,
    pub iec_build_options: Vec<String>,
    /// Target system derived from the module id
    pub target_system: TargetSystem,
}

impl Configuration {
    /// Load a configuration from its `Physical.pkg` entry.
    pub async fn load(
        fs: &dyn FileSystem,
        object: &PackageObject,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        let root_path = object.resolved_path.clone();
        let config = ConfigPackage::load(fs, &root_path.join("Config.pkg"), project_root).await?;
        let cpu_path = config.cpu.resolved_path.clone();
        let cpu = CpuPackage::load(fs, &cpu_path.join("Cpu.pkg"), project_root).await?;

        let target_system =
            TargetSystem::from_module_id(cpu.module_id.as_deref().unwrap_or_default());

        Ok(Configuration {
            name: object.file_name(),
            description: object.description.clone(),
            root_path,
            cpu_path,
            module_id: cpu.module_id,
            runtime_version: cpu.runtime_version,
            compiler_version: cpu.compiler_version,
            include_directories: cpu.include_directories,
            build_options: cpu.build_options,
            ansic_build_options: cpu.ansic_build_options,
            iec_build_options: cpu.iec_build_options,
            target_system,
        })
    }

    /// Load every configuration listed by `Physical.pkg`.
    ///
    /// A project without a readable physical view has no configurations.
    /// A configuration that fails to load is logged and skipped.
    pub async fn load_all(fs: &dyn FileSystem, paths: &ProjectPaths) -> Vec<Configuration> {
        let loaded = PhysicalPackage::load(fs, &paths.physical_package(), &paths.root).await;
        let physical = match loaded {
            Ok(physical) => physical,
            Err(e) => {
                warn!("Project has no usable physical view: {}", e);
                return Vec::new();
            }
        };

        let mut configurations = Vec::new();
        for object in physical.configurations() {
            match Configuration::load(fs, object, &paths.root).await {
                Ok(configuration) => configurations.push(configuration),
                Err(e) => warn!("Skipping configuration {}: {}", object.file_name(), e),
            }
        }
        configurations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{package_xml, MockFileSystem, ProjectFixture};
    use crate::toolchain::{Architecture, SystemGeneration};

    #[tokio::test]
    async fn test_load_configurations() {
        let fs = MockFileSystem::new();
        ProjectFixture::new("/ws/P", "P").write_mock(&fs);
        let paths = ProjectPaths::new(Path::new("/ws/P/P.apj"));

        let configs = Configuration::load_all(&fs, &paths).await;
        let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Sim", "Hw"]);

        let sim = &configs[0];
        assert_eq!(sim.module_id.as_deref(), Some("X20CP1586"));
        assert_eq!(sim.compiler_version.as_deref(), Some("4.1.2"));
        assert_eq!(sim.cpu_path, PathBuf::from("/ws/P/Physical/Sim/X20CP1586"));
        assert_eq!(
            sim.target_system,
            TargetSystem::new(SystemGeneration::Sg4, Architecture::Ia32)
        );
        assert_eq!(configs[1].target_system.architecture, Architecture::Arm);
    }

    #[tokio::test]
    async fn test_broken_configuration_is_skipped() {
        let fs = MockFileSystem::new();
        ProjectFixture::new("/ws/P", "P").write_mock(&fs);
        fs.add_file(
            "/ws/P/Physical/Physical.pkg",
            package_xml(
                "Physical",
                &[("Configuration", "Sim", false), ("Configuration", "Gone", false)],
            ),
        );

        let paths = ProjectPaths::new(Path::new("/ws/P/P.apj"));
        let configs = Configuration::load_all(&fs, &paths).await;
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "Sim");
    }

    #[tokio::test]
    async fn test_missing_physical_view_yields_nothing() {
        let fs = MockFileSystem::new();
        let paths = ProjectPaths::new(Path::new("/ws/P/P.apj"));
        let configs = Configuration::load_all(&fs, &paths).await;
        assert!(configs.is_empty());
    }
}
