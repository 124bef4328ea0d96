//! `Physical/Physical.pkg`: the list of configurations.

use std::path::Path;

use super::{PackageError, PackageFile, PackageObject};
use crate::util::fs::FileSystem;

/// `Physical/Physical.pkg`.
#[derive(Debug, Clone)]
pub struct PhysicalPackage {
    pub package: PackageFile,
}

impl PhysicalPackage {
    pub fn from_package(package: PackageFile) -> Result<Self, PackageError> {
        package.expect_kind("Physical")?;
        Ok(PhysicalPackage { package })
    }

    pub async fn load(
        fs: &dyn FileSystem,
        path: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        Self::from_package(PackageFile::load(fs, path, project_root).await?)
    }

    /// `Configuration`-typed children in declaration order.
    pub fn configurations(&self) -> impl Iterator<Item = &PackageObject> {
        self.package.objects_of_kind("Configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_lists_configurations() {
        let physical = PhysicalPackage::from_package(
            PackageFile::parse(
                Path::new("/p/Physical/Physical.pkg"),
                r#"<Physical><Objects>
                     <Object Type="Configuration" Description="Simulation">Sim</Object>
                     <Object Type="File">Readme.txt</Object>
                     <Object Type="Configuration">Hw</Object>
                   </Objects></Physical>"#,
                Path::new("/p"),
            )
            .unwrap(),
        )
        .unwrap();

        let names: Vec<String> = physical.configurations().map(|c| c.file_name()).collect();
        assert_eq!(names, ["Sim", "Hw"]);
    }
}
