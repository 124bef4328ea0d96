//! Package files.
//!
//! Every directory level of an Automation Studio project declares its
//! contents in a package file: a root element naming the package type, an
//! optional `SubType` attribute, and exactly one children container
//! (`Objects` or `Files`) listing child objects by path.
//!
//! [`PackageFile`] is the generic, validated view. The submodules add the
//! per-format rules on top of it by composition.

pub mod configuration;
pub mod cpu;
pub mod physical;
pub mod project_file;
pub mod settings;
pub mod unit;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::fs::{normalize_path, resolve_from_root, to_portable_path, FileSystem};
use crate::xml::{self, VersionHeader, XmlDocument, XmlElement, XmlError};

pub use configuration::ConfigPackage;
pub use cpu::CpuPackage;
pub use physical::PhysicalPackage;
pub use project_file::ProjectFile;
pub use settings::UserSettings;
pub use unit::{UnitKind, UnitLanguage, UnitPackage};

/// Children container names and the element name of their entries.
const CONTAINERS: &[(&str, &str)] = &[("Objects", "Object"), ("Files", "File")];

/// Error while reading a package file. Fatal for the package being built.
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: XmlError,
    },

    #[error("{}: expected exactly one `Objects` or `Files` element, found {found}", .path.display())]
    ChildrenContainer { path: PathBuf, found: usize },

    #[error("{}: child object #{index} has no path", .path.display())]
    MissingObjectPath { path: PathBuf, index: usize },

    #[error("{}: expected root element `{expected}`, found `{found}`", .path.display())]
    UnexpectedRoot {
        path: PathBuf,
        expected: &'static str,
        found: String,
    },

    #[error("{}: expected exactly one `{kind}` object, found {found}", .path.display())]
    ChildCount {
        path: PathBuf,
        kind: &'static str,
        found: usize,
    },
}

impl PackageError {
    /// The file the error refers to.
    pub fn path(&self) -> &Path {
        match self {
            PackageError::Io { path, .. }
            | PackageError::Xml { path, .. }
            | PackageError::ChildrenContainer { path, .. }
            | PackageError::MissingObjectPath { path, .. }
            | PackageError::UnexpectedRoot { path, .. }
            | PackageError::ChildCount { path, .. } => path,
        }
    }
}

/// Read and parse an XML file into a generic document.
pub async fn load_document(fs: &dyn FileSystem, path: &Path) -> Result<XmlDocument, PackageError> {
    let text = fs
        .read_to_string(path)
        .await
        .map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    xml::parse(&text).map_err(|source| PackageError::Xml {
        path: path.to_path_buf(),
        source,
    })
}

/// One child entry of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageObject {
    /// Path as written, in forward-slash form
    pub path: String,
    /// `Type` attribute
    pub kind: Option<String>,
    /// `Language` attribute
    pub language: Option<String>,
    /// `Description` attribute
    pub description: Option<String>,
    /// `Reference="true"`: the path is relative to the project root
    pub is_reference: bool,
    /// `Private="true"`
    pub is_private: bool,
    /// Path after applying the resolution rule
    pub resolved_path: PathBuf,
}

impl PackageObject {
    /// Resolve an object path.
    ///
    /// Plain objects live next to their package file. Referenced objects are
    /// placed symbolically and resolve against the project root, which also
    /// admits absolute values.
    pub fn resolve_path(
        path: &str,
        is_reference: bool,
        containing_dir: &Path,
        project_root: &Path,
    ) -> PathBuf {
        if is_reference {
            resolve_from_root(project_root, path)
        } else {
            normalize_path(&containing_dir.join(to_portable_path(path)))
        }
    }

    fn from_element(
        element: &XmlElement,
        index: usize,
        package_path: &Path,
        containing_dir: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        let raw = element.text().unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(PackageError::MissingObjectPath {
                path: package_path.to_path_buf(),
                index,
            });
        }

        let is_reference = element.attr_flag("Reference");
        let path = to_portable_path(raw);
        let resolved_path = Self::resolve_path(&path, is_reference, containing_dir, project_root);

        Ok(PackageObject {
            path,
            kind: element.attr("Type").map(str::to_string),
            language: element.attr("Language").map(str::to_string),
            description: element.attr("Description").map(str::to_string),
            is_reference,
            is_private: element.attr_flag("Private"),
            resolved_path,
        })
    }

    /// Whether the object has the given `Type`, ignoring case.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind
            .as_deref()
            .is_some_and(|k| k.eq_ignore_ascii_case(kind))
    }

    /// Last component of the resolved path.
    pub fn file_name(&self) -> String {
        self.resolved_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }
}

/// A validated package file.
#[derive(Debug, Clone)]
pub struct PackageFile {
    /// Location of the package file
    pub path: PathBuf,
    /// Root element name
    pub kind: String,
    /// `SubType` attribute of the root element
    pub sub_type: Option<String>,
    /// Declared version header
    pub header: VersionHeader,
    /// Child objects in declaration order
    pub objects: Vec<PackageObject>,
    /// The underlying document, for format-specific reads
    pub document: XmlDocument,
}

impl PackageFile {
    /// Validate a parsed document as a package.
    pub fn from_document(
        path: &Path,
        document: XmlDocument,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        let root = &document.root;

        let containers: Vec<(&XmlElement, &str)> = CONTAINERS
            .iter()
            .flat_map(|(container, entry)| {
                root.children_named(container).iter().map(move |e| (e, *entry))
            })
            .collect();

        let [(container, entry_name)] = containers.as_slice() else {
            return Err(PackageError::ChildrenContainer {
                path: path.to_path_buf(),
                found: containers.len(),
            });
        };

        let containing_dir = path.parent().unwrap_or(Path::new(""));
        let objects = container
            .children_named(entry_name)
            .iter()
            .enumerate()
            .map(|(index, element)| {
                PackageObject::from_element(element, index, path, containing_dir, project_root)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PackageFile {
            path: path.to_path_buf(),
            kind: root.name.clone(),
            sub_type: root.attr("SubType").map(str::to_string),
            header: document.header.clone(),
            objects,
            document,
        })
    }

    /// Parse package text.
    pub fn parse(path: &Path, text: &str, project_root: &Path) -> Result<Self, PackageError> {
        let document = xml::parse(text).map_err(|source| PackageError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_document(path, document, project_root)
    }

    /// Read and parse a package file.
    pub async fn load(
        fs: &dyn FileSystem,
        path: &Path,
        project_root: &Path,
    ) -> Result<Self, PackageError> {
        let document = load_document(fs, path).await?;
        Self::from_document(path, document, project_root)
    }

    /// Directory containing the package file.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new(""))
    }

    /// Child objects with the given `Type`.
    pub fn objects_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a PackageObject> {
        self.objects.iter().filter(move |o| o.is_kind(kind))
    }

    /// Require the root element to have a given name.
    pub fn expect_kind(&self, expected: &'static str) -> Result<(), PackageError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(PackageError::UnexpectedRoot {
                path: self.path.clone(),
                expected,
                found: self.kind.clone(),
            })
        }
    }
}
