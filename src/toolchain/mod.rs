//! Toolchain catalog.
//!
//! Discovers installed Automation Studio versions and their bundled gcc
//! compilers below the configured installation roots, and answers
//! best-match queries against them.
//!
//! Discovery is memoized in a [`ScanCache`]; concurrent queries share one
//! scan and [`ToolchainCatalog::rescan`] replaces it.

pub mod gcc;
pub mod studio;
pub mod target;
pub mod version;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::util::fs::FileSystem;
use crate::util::process::ProcessRunner;
use crate::util::scan_cache::ScanCache;

pub use gcc::{select_gcc_executable, GccExecutable, GccInstallation, GccRequest};
pub use studio::{discover_studio_installations, StudioInstallation};
pub use target::{Architecture, SystemGeneration, TargetSystem};
pub use version::{request_version, Versioned};

/// Memoized catalog of installed toolchains.
pub struct ToolchainCatalog {
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
    roots: Vec<PathBuf>,
    strict: bool,
    cache: ScanCache<Vec<StudioInstallation>>,
}

impl ToolchainCatalog {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
        roots: Vec<PathBuf>,
        strict: bool,
    ) -> Self {
        ToolchainCatalog {
            fs,
            runner,
            roots,
            strict,
            cache: ScanCache::new(),
        }
    }

    /// Installation roots scanned by this catalog.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Whether lookups refuse to fall back to non-matching versions.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    async fn scan(&self) -> Vec<StudioInstallation> {
        let found =
            discover_studio_installations(self.fs.as_ref(), self.runner.as_ref(), &self.roots)
                .await;
        debug!("Toolchain scan found {} installation(s)", found.len());
        found
    }

    /// Installed Automation Studio versions, newest first.
    pub async fn installations(&self) -> Arc<Vec<StudioInstallation>> {
        self.cache.get_or_scan(|| self.scan()).await
    }

    /// Discard the cached scan and scan again.
    pub async fn rescan(&self) -> Arc<Vec<StudioInstallation>> {
        let (_, installations) = self.cache.rescan(|| self.scan()).await;
        installations
    }

    /// Installation best matching a requested IDE version.
    pub async fn find_studio(&self, requested: Option<&str>) -> Option<StudioInstallation> {
        let installations = self.installations().await;
        request_version(&installations, requested, self.strict).cloned()
    }

    /// Compiler best matching a request, taken from the installation best
    /// matching `studio_version`.
    pub async fn find_compiler(
        &self,
        studio_version: Option<&str>,
        request: &GccRequest,
    ) -> Option<GccExecutable> {
        let studio = self.find_studio(studio_version).await?;
        let executables = studio.gcc_executables();
        let found = select_gcc_executable(&executables, request, self.strict).cloned();
        if found.is_none() {
            debug!(
                "No gcc in Automation Studio {} matches {:?}",
                studio.version, request
            );
        }
        found
    }
}
