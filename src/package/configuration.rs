//! `Config.pkg`: one configuration of the physical view.

use std::path::Path;

use super::{PackageError, PackageFile, PackageObject};
use crate::util::fs::FileSystem;

/// `Physical/<configuration>/Config.pkg`.
#[derive(Debug, Clone)]
pub struct ConfigPackage {
    pub package: PackageFile,
    /// The single `Cpu` child
    pub cpu: PackageObject,
}

impl ConfigPackage {
    pub fn from_package(package: PackageFile) -> Result<Self, PackageError> {
        package.expect_kind("Configuration")?;

        let cpus: Vec<&PackageObject> = package.objects_of_kind("Cpu").collect();
        let [cpu] = cpus.as_slice() else {
            return Err(PackageError::ChildCount {
                path: package.path.clone(),
                kind: "Cpu",
                found: cpus.len(),
            });
        };
        let cpu = (*cpu).clone();

        Ok(ConfigPackage { package, cpu })
    }

    pub async fn load(
        fs: &dyn FileSystem,
        path: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        Self::from_package(PackageFile::load(fs, path, project_root).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(path: &str, text: &str) -> PackageFile {
        PackageFile::parse(Path::new(path), text, Path::new("/p")).unwrap()
    }

    #[test]
    fn test_config_requires_one_cpu() {
        let config = ConfigPackage::from_package(parse(
            "/p/Physical/Sim/Config.pkg",
            r#"<Configuration><Objects><Object Type="Cpu">PC</Object><Object Type="File">Hardware.hw</Object></Objects></Configuration>"#,
        ))
        .unwrap();
        assert_eq!(config.cpu.resolved_path, PathBuf::from("/p/Physical/Sim/PC"));

        let err = ConfigPackage::from_package(parse(
            "/p/Physical/Sim/Config.pkg",
            r#"<Configuration><Objects><Object Type="File">Hardware.hw</Object></Objects></Configuration>"#,
        ))
        .unwrap_err();
        assert!(matches!(err, PackageError::ChildCount { kind: "Cpu", found: 0, .. }));

        let err = ConfigPackage::from_package(parse(
            "/p/Physical/Sim/Config.pkg",
            r#"<Configuration><Objects><Object Type="Cpu">A</Object><Object Type="Cpu">B</Object></Objects></Configuration>"#,
        ))
        .unwrap_err();
        assert!(matches!(err, PackageError::ChildCount { found: 2, .. }));
    }
}
