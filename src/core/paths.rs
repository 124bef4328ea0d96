//! Canonical directories of a project.

use std::path::{Path, PathBuf};

/// Directory holding per-configuration global declarations below
/// `Temp/Includes`.
pub const TEMP_DECLARATIONS_DIR: &str = "AS_TempDecl";

/// File holding per-user settings such as the active configuration.
pub const USER_SETTINGS_FILE: &str = "LastUser.set";

/// Directory layout derived from the location of a project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// The `*.apj` file
    pub project_file: PathBuf,
    /// Directory containing the project file
    pub root: PathBuf,
    /// `Logical`
    pub logical: PathBuf,
    /// `Physical`
    pub physical: PathBuf,
    /// `Temp`
    pub temp: PathBuf,
    /// `Temp/Includes`, mirrors the logical tree with generated headers
    pub temp_includes: PathBuf,
    /// `Binaries`
    pub binaries: PathBuf,
    /// `LastUser.set`
    pub user_settings: PathBuf,
}

impl ProjectPaths {
    pub fn new(project_file: &Path) -> Self {
        let root = project_file.parent().unwrap_or(Path::new("")).to_path_buf();
        let temp = root.join("Temp");
        ProjectPaths {
            project_file: project_file.to_path_buf(),
            logical: root.join("Logical"),
            physical: root.join("Physical"),
            temp_includes: temp.join("Includes"),
            temp,
            binaries: root.join("Binaries"),
            user_settings: root.join(USER_SETTINGS_FILE),
            root,
        }
    }

    /// `Logical/Package.pkg`.
    pub fn logical_package(&self) -> PathBuf {
        self.logical.join("Package.pkg")
    }

    /// `Physical/Physical.pkg`.
    pub fn physical_package(&self) -> PathBuf {
        self.physical.join("Physical.pkg")
    }

    /// Generated header directory mirroring a logical path.
    pub fn mirror_include_dir(&self, logical_path: &Path) -> PathBuf {
        self.temp_includes.join(logical_path)
    }

    /// Generated global declarations of a configuration.
    pub fn configuration_globals_dir(&self, configuration: &str) -> PathBuf {
        self.temp_includes
            .join(TEMP_DECLARATIONS_DIR)
            .join(configuration)
    }
}
