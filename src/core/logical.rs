//! The logical view: programs, libraries and data objects below `Logical`.
//!
//! Units are found by walking the logical directory tree. A directory that
//! contains a unit package file (`.prg`, `.lby`, `.dob`) is a unit and is not
//! descended into. Package files may reference directories or unit packages
//! elsewhere (`Reference="true"`); those are followed too and take their
//! logical position from the package that references them.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::paths::ProjectPaths;
use crate::package::{PackageError, PackageFile, UnitKind, UnitLanguage, UnitPackage};
use crate::util::fs::{normalize_path, FileSystem};

/// A program, library or data object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Directory of the unit
    pub root_path: PathBuf,
    /// The unit package file
    pub package_path: PathBuf,
    pub kind: UnitKind,
    pub language: UnitLanguage,
    /// Files listed by the unit package
    pub files: Vec<PathBuf>,
    /// Libraries this unit depends on
    pub dependencies: Vec<String>,
    /// Position in the logical tree, relative to `Logical`
    pub logical_path: PathBuf,
    /// Reached through a referencing package
    pub is_reference: bool,
}

impl Unit {
    fn new(package: UnitPackage, logical_path: PathBuf, is_reference: bool) -> Self {
        let package_path = package.package.path.clone();
        let root_path = package_path.parent().unwrap_or(Path::new("")).to_path_buf();
        Unit {
            root_path,
            package_path,
            kind: package.kind,
            language: package.language,
            files: package.files,
            dependencies: package.dependencies,
            logical_path,
            is_reference,
        }
    }

    /// Display name, the unit directory's name.
    pub fn name(&self) -> String {
        self.root_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Whether a path lies inside the unit directory.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root_path)
    }
}

/// All units of a project.
#[derive(Debug, Clone)]
pub struct LogicalView {
    /// The logical root directory
    pub root: PathBuf,
    /// `Logical/Package.pkg`
    pub package: PackageFile,
    /// Units sorted by logical path
    pub units: Vec<Unit>,
}

struct PendingDir {
    dir: PathBuf,
    logical_path: PathBuf,
    is_reference: bool,
}

impl LogicalView {
    /// Discover the logical view.
    ///
    /// Failing to read `Logical/Package.pkg` is fatal. A unit or nested
    /// package that fails to parse is logged and skipped.
    pub async fn discover(fs: &dyn FileSystem, paths: &ProjectPaths) -> Result<Self, PackageError> {
        let package = PackageFile::load(fs, &paths.logical_package(), &paths.root).await?;

        let mut units: Vec<Unit> = Vec::new();
        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut queue = VecDeque::from([PendingDir {
            dir: paths.logical.clone(),
            logical_path: PathBuf::new(),
            is_reference: false,
        }]);

        while let Some(pending) = queue.pop_front() {
            if !visited.insert(normalize_path(&pending.dir)) {
                continue;
            }

            let entries = match fs.read_dir(&pending.dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cannot list {}: {}", pending.dir.display(), e);
                    continue;
                }
            };

            let unit_files: Vec<&Path> = entries
                .iter()
                .filter(|e| !e.is_dir && UnitKind::is_unit_package(&e.path))
                .map(|e| e.path.as_path())
                .collect();
            if !unit_files.is_empty() {
                for file in unit_files {
                    let unit = load_unit(
                        fs,
                        file,
                        &paths.root,
                        &pending.logical_path,
                        pending.is_reference,
                    )
                    .await;
                    if let Some(unit) = unit {
                        units.push(unit);
                    }
                }
                continue;
            }

            for entry in entries.iter().filter(|e| e.is_dir) {
                queue.push_back(PendingDir {
                    dir: entry.path.clone(),
                    logical_path: pending.logical_path.join(entry.file_name()),
                    is_reference: pending.is_reference,
                });
            }

            let nested;
            let dir_package = if pending.dir == paths.logical {
                Some(&package)
            } else {
                nested = load_nested_package(fs, &pending.dir, &paths.root).await;
                nested.as_ref()
            };

            let Some(dir_package) = dir_package else {
                continue;
            };

            for object in dir_package.objects.iter().filter(|o| o.is_reference) {
                let target = &object.resolved_path;
                if UnitKind::is_unit_package(target) {
                    let name = target
                        .parent()
                        .and_then(Path::file_name)
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let logical_path = pending.logical_path.join(name);
                    let unit = load_unit(fs, target, &paths.root, &logical_path, true).await;
                    if let Some(unit) = unit {
                        if visited.insert(normalize_path(&unit.root_path)) {
                            units.push(unit);
                        }
                    }
                } else if fs.is_dir(target).await {
                    queue.push_back(PendingDir {
                        dir: target.clone(),
                        logical_path: pending.logical_path.join(object.file_name()),
                        is_reference: true,
                    });
                } else {
                    warn!(
                        "{}: referenced object {} does not exist",
                        dir_package.path.display(),
                        target.display()
                    );
                }
            }
        }

        units.sort_by(|a, b| a.logical_path.cmp(&b.logical_path));
        units.dedup_by(|a, b| a.package_path == b.package_path);
        debug!("Found {} unit(s) below {}", units.len(), paths.logical.display());

        Ok(LogicalView {
            root: paths.logical.clone(),
            package,
            units,
        })
    }

    /// The unit containing a path, innermost first.
    pub fn unit_of(&self, path: &Path) -> Option<&Unit> {
        self.units
            .iter()
            .filter(|u| u.contains(path))
            .max_by_key(|u| u.root_path.components().count())
    }
}

async fn load_unit(
    fs: &dyn FileSystem,
    file: &Path,
    project_root: &Path,
    logical_path: &Path,
    is_reference: bool,
) -> Option<Unit> {
    match UnitPackage::load(fs, file, project_root).await {
        Ok(package) => Some(Unit::new(package, logical_path.to_path_buf(), is_reference)),
        Err(e) => {
            warn!("Skipping unit: {}", e);
            None
        }
    }
}

async fn load_nested_package(
    fs: &dyn FileSystem,
    dir: &Path,
    project_root: &Path,
) -> Option<PackageFile> {
    let path = dir.join("Package.pkg");
    if !fs.exists(&path).await {
        return None;
    }
    match PackageFile::load(fs, &path, project_root).await {
        Ok(package) => Some(package),
        Err(e) => {
            warn!("Ignoring package: {}", e);
            None
        }
    }
}
