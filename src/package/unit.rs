//! Unit packages: programs (`.prg`), libraries (`.lby`) and data objects
//! (`.dob`).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{PackageError, PackageFile};
use crate::util::fs::FileSystem;

/// Kind of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitKind {
    Program,
    Library,
    DataObject,
}

impl UnitKind {
    /// Unit package file extensions.
    pub const EXTENSIONS: &'static [&'static str] = &["prg", "lby", "dob"];

    /// Kind named by a package root element.
    pub fn from_root(name: &str) -> Option<Self> {
        match name {
            "Program" => Some(UnitKind::Program),
            "Library" => Some(UnitKind::Library),
            "DataObject" => Some(UnitKind::DataObject),
            _ => None,
        }
    }

    /// Kind implied by a unit package file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "prg" => Some(UnitKind::Program),
            "lby" => Some(UnitKind::Library),
            "dob" => Some(UnitKind::DataObject),
            _ => None,
        }
    }

    /// Whether a path names a unit package file.
    pub fn is_unit_package(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitKind::Program => "program",
            UnitKind::Library => "library",
            UnitKind::DataObject => "data object",
        };
        f.write_str(name)
    }
}

/// Implementation language of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnitLanguage {
    /// IEC 61131-3 languages (ST, LD, ...)
    Iec,
    /// Native C/C++
    Ansic,
    /// Precompiled binary library
    Binary,
    Other,
}

impl UnitLanguage {
    /// Parse a `SubType` value or unit package file stem.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "IEC" => Some(UnitLanguage::Iec),
            "ANSIC" => Some(UnitLanguage::Ansic),
            "BINARY" => Some(UnitLanguage::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for UnitLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitLanguage::Iec => "IEC",
            UnitLanguage::Ansic => "ANSIC",
            UnitLanguage::Binary => "Binary",
            UnitLanguage::Other => "other",
        };
        f.write_str(name)
    }
}

/// A classified unit package.
#[derive(Debug, Clone)]
pub struct UnitPackage {
    pub package: PackageFile,
    pub kind: UnitKind,
    pub language: UnitLanguage,
    /// Resolved paths of the listed files
    pub files: Vec<PathBuf>,
    /// Names of libraries this library depends on
    pub dependencies: Vec<String>,
}

impl UnitPackage {
    /// Classify a parsed package.
    ///
    /// Older project versions omit `SubType`; their language is then taken
    /// from the file name (`IEC.prg`, `ANSIC.lby`, `Binary.lby`).
    pub fn from_package(package: PackageFile) -> Result<Self, PackageError> {
        let extension = package
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let kind = UnitKind::from_root(&package.kind)
            .or_else(|| UnitKind::from_extension(extension))
            .ok_or_else(|| PackageError::UnexpectedRoot {
                path: package.path.clone(),
                expected: "Program, Library or DataObject",
                found: package.kind.clone(),
            })?;

        let stem = package
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let language = package
            .sub_type
            .as_deref()
            .and_then(UnitLanguage::from_name)
            .or_else(|| UnitLanguage::from_name(&stem))
            .unwrap_or(UnitLanguage::Other);

        let files = package
            .objects
            .iter()
            .map(|o| o.resolved_path.clone())
            .collect();

        let dependencies = package
            .document
            .root
            .find("Dependencies")
            .map(|deps| {
                deps.children_named("Dependency")
                    .iter()
                    .filter_map(|d| d.attr("ObjectName"))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(UnitPackage {
            package,
            kind,
            language,
            files,
            dependencies,
        })
    }

    /// Read and classify a unit package file.
    pub async fn load(
        fs: &dyn FileSystem,
        path: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        Self::from_package(PackageFile::load(fs, path, project_root).await?)
    }
}
