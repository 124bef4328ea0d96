//! The `*.apj` project file.

use std::path::Path;

use semver::Version;

use super::{load_document, PackageError};
use crate::util::fs::FileSystem;
use crate::xml::{self, XmlDocument};

/// Project-level metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    /// File stem of the project file
    pub name: String,
    /// `Project@Description`
    pub description: Option<String>,
    /// `Project@Version`
    pub version: Option<String>,
    /// IDE version the project was last saved with (`WorkingVersion` header)
    pub working_version: Option<String>,
    /// `ANSIC@DefaultIncludesInHeader`
    pub default_includes_in_header: bool,
}

impl ProjectFile {
    pub fn from_document(path: &Path, document: &XmlDocument) -> Result<Self, PackageError> {
        let root = &document.root;
        if root.name != "Project" {
            return Err(PackageError::UnexpectedRoot {
                path: path.to_path_buf(),
                expected: "Project",
                found: root.name.clone(),
            });
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(ProjectFile {
            name,
            description: root.attr("Description").map(str::to_string),
            version: root.attr("Version").map(str::to_string),
            working_version: document.header.working_version.clone(),
            default_includes_in_header: root
                .child("ANSIC")
                .is_some_and(|a| a.attr_flag("DefaultIncludesInHeader")),
        })
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, PackageError> {
        let document = xml::parse(text).map_err(|source| PackageError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(path, &document)
    }

    pub async fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, PackageError> {
        let document = load_document(fs, path).await?;
        Self::from_document(path, &document)
    }

    /// Working version as a semantic version.
    pub fn required_studio_version(&self) -> Option<Version> {
        self.working_version
            .as_deref()
            .and_then(crate::toolchain::version::coerce_version)
    }
}
