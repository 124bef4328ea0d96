//! Automation Studio installations.
//!
//! An installation root such as `C:\BrAutomation` holds one directory per
//! installed IDE version: `AS49` is 4.9, `AS410` is 4.10. A directory only
//! counts as an installation if it contains the build executable.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use semver::Version;
use serde::Serialize;
use tracing::{debug, warn};

use super::gcc::{discover_gcc_installations, GccExecutable, GccInstallation};
use super::version::{sort_newest_first, version_or_default, Versioned};
use crate::util::fs::FileSystem;
use crate::util::process::ProcessRunner;

static INSTALL_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^AS(\d)(\d+)$").expect("studio directory pattern is valid")
});

/// Spellings of the English binaries directory seen in the wild.
const BIN_DIRS: &[&str] = &["bin-en", "Bin-en"];

const BUILD_EXE: &str = "BR.AS.Build.exe";

/// One installed Automation Studio version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudioInstallation {
    pub version: Version,
    pub root_path: PathBuf,
    /// Path to `BR.AS.Build.exe`
    pub build_exe: PathBuf,
    /// Bundled gcc installations, newest first
    pub gcc_installations: Vec<GccInstallation>,
}

impl Versioned for StudioInstallation {
    fn version(&self) -> &Version {
        &self.version
    }
}

impl StudioInstallation {
    /// Version encoded in an installation directory name (`AS49` -> `4.9`).
    pub fn version_from_dir_name(name: &str) -> Option<String> {
        INSTALL_DIR
            .captures(name)
            .map(|caps| format!("{}.{}", &caps[1], &caps[2]))
    }

    /// Load an installation, failing if the build executable is missing.
    pub async fn load(
        fs: &dyn FileSystem,
        runner: &dyn ProcessRunner,
        root: &Path,
        raw_version: &str,
    ) -> Result<Self> {
        let mut build_exe = None;
        for dir in BIN_DIRS {
            let candidate = root.join(dir).join(BUILD_EXE);
            if fs.exists(&candidate).await {
                build_exe = Some(candidate);
                break;
            }
        }
        let Some(build_exe) = build_exe else {
            bail!("{} has no bin-en/{}", root.display(), BUILD_EXE);
        };

        let version = version_or_default(raw_version, &root.display().to_string());
        let gnuinst = root.join("AS").join("gnuinst");
        let gcc_installations = discover_gcc_installations(fs, runner, &gnuinst).await;

        Ok(StudioInstallation {
            version,
            root_path: root.to_path_buf(),
            build_exe,
            gcc_installations,
        })
    }

    /// All gcc executables of this installation, best first.
    pub fn gcc_executables(&self) -> Vec<GccExecutable> {
        let mut executables: Vec<GccExecutable> = self
            .gcc_installations
            .iter()
            .flat_map(|i| i.executables.iter().cloned())
            .collect();
        executables.sort_by(GccExecutable::best_first);
        executables
    }
}

/// Discover installations below the given roots, newest first.
pub async fn discover_studio_installations(
    fs: &dyn FileSystem,
    runner: &dyn ProcessRunner,
    roots: &[PathBuf],
) -> Vec<StudioInstallation> {
    let mut installations = Vec::new();

    for root in roots {
        let entries = match fs.read_dir(root).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Skipping installation root {}: {}", root.display(), e);
                continue;
            }
        };

        for entry in entries.iter().filter(|e| e.is_dir) {
            let Some(raw_version) = StudioInstallation::version_from_dir_name(&entry.file_name())
            else {
                continue;
            };
            match StudioInstallation::load(fs, runner, &entry.path, &raw_version).await {
                Ok(installation) => {
                    debug!(
                        "Found Automation Studio {} at {}",
                        installation.version,
                        entry.path.display()
                    );
                    installations.push(installation);
                }
                Err(e) => warn!("Skipping {}: {:#}", entry.path.display(), e),
            }
        }
    }

    sort_newest_first(&mut installations);
    installations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockExecutor, MockFileSystem};

    #[test]
    fn test_dir_name_pattern() {
        assert_eq!(StudioInstallation::version_from_dir_name("AS49").as_deref(), Some("4.9"));
        assert_eq!(StudioInstallation::version_from_dir_name("AS410").as_deref(), Some("4.10"));
        assert!(StudioInstallation::version_from_dir_name("AS").is_none());
        assert!(StudioInstallation::version_from_dir_name("Tools").is_none());
        assert!(StudioInstallation::version_from_dir_name("AS4x").is_none());
    }

    #[tokio::test]
    async fn test_discover_sorts_newest_first_and_drops_invalid() {
        let fs = MockFileSystem::new();
        fs.add_file("/BrAutomation/AS49/bin-en/BR.AS.Build.exe", "");
        fs.add_file("/BrAutomation/AS49/AS/gnuinst/V4.1.2/bin/i386-elf-gcc.exe", "");
        fs.add_file("/BrAutomation/AS410/Bin-en/BR.AS.Build.exe", "");
        fs.add_file("/BrAutomation/AS46/readme.txt", "");
        fs.add_dir("/BrAutomation/Updates");

        let runner = MockExecutor::new();
        let roots = vec![PathBuf::from("/BrAutomation"), PathBuf::from("/missing")];
        let found = discover_studio_installations(&fs, &runner, &roots).await;

        let versions: Vec<String> = found.iter().map(|i| i.version.to_string()).collect();
        assert_eq!(versions, ["4.10.0", "4.9.0"]);
        assert_eq!(
            found[0].build_exe,
            PathBuf::from("/BrAutomation/AS410/Bin-en/BR.AS.Build.exe")
        );
        assert!(found[0].gcc_executables().is_empty());
        assert_eq!(found[1].gcc_executables().len(), 1);
    }
}
