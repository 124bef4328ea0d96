//! Global context for brtools operations.
//!
//! Holds the working directory, the workspace folders and the merged
//! configuration, and wires up the long-lived services (project registry,
//! toolchain catalog, build-info resolver) against the real filesystem.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::build_info::BuildInfoResolver;
use crate::core::ProjectRegistry;
use crate::toolchain::ToolchainCatalog;
use crate::util::config::{global_config_path, load_config, workspace_config_path, Config};
use crate::util::fs::{normalize_path, FileSystem, RealFileSystem};
use crate::util::process::{ProcessRunner, SystemProcessRunner};
use crate::util::watch::PollingWatcher;

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Folders searched for projects, absolute
    workspace_folders: Vec<PathBuf>,

    /// Merged configuration
    config: Config,

    /// Whether to use verbose output
    verbose: bool,
}

impl GlobalContext {
    /// Create a context for the current directory, loading configuration
    /// from the global and workspace locations.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let config = load_config(global_config_path().as_deref(), &workspace_config_path(&cwd));
        GlobalContext {
            workspace_folders: vec![cwd.clone()],
            cwd,
            config,
            verbose: false,
        }
    }

    /// Replace the workspace folders. Relative folders are taken from the
    /// working directory; an empty list means the working directory.
    pub fn with_workspace_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.workspace_folders = if folders.is_empty() {
            vec![self.cwd.clone()]
        } else {
            folders.iter().map(|f| self.absolute(f)).collect()
        };
        self
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn workspace_folders(&self) -> &[PathBuf] {
        &self.workspace_folders
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make a path absolute against the working directory, lexically.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        normalize_path(&self.cwd.join(path))
    }

    /// Project registry over the workspace folders.
    pub fn project_registry(&self, fs: Arc<dyn FileSystem>) -> ProjectRegistry {
        ProjectRegistry::with_config(
            fs,
            Arc::new(PollingWatcher::new(self.config.poll_interval())),
            self.workspace_folders.clone(),
            &self.config,
        )
    }

    /// Toolchain catalog over the configured installation roots.
    pub fn toolchain_catalog(
        &self,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
    ) -> ToolchainCatalog {
        ToolchainCatalog::new(
            fs,
            runner,
            self.config.installation_roots(),
            self.config.strict_version_matching(),
        )
    }

    /// Resolver backed by the real filesystem and real processes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build_info_resolver(&self) -> BuildInfoResolver {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let registry = self.project_registry(Arc::clone(&fs));
        let catalog = self.toolchain_catalog(fs, Arc::new(SystemProcessRunner));
        BuildInfoResolver::new(Arc::new(registry), Arc::new(catalog))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectFixture;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_folders_are_absolute() {
        let ctx = GlobalContext::with_cwd(PathBuf::from("/work"))
            .with_config(Config::default())
            .with_workspace_folders(vec![PathBuf::from("a"), PathBuf::from("/b/../c")]);
        assert_eq!(
            ctx.workspace_folders(),
            &[PathBuf::from("/work/a"), PathBuf::from("/c")]
        );

        let ctx = ctx.with_workspace_folders(Vec::new());
        assert_eq!(ctx.workspace_folders(), &[PathBuf::from("/work")]);
    }

    #[test]
    fn test_catalog_uses_config() {
        let mut config = Config::default();
        config.toolchain.installation_roots = vec![PathBuf::from("/opt/BrAutomation")];
        config.toolchain.strict_version_matching = Some(true);

        let ctx = GlobalContext::with_cwd(PathBuf::from("/work")).with_config(config);
        let catalog =
            ctx.toolchain_catalog(Arc::new(RealFileSystem), Arc::new(SystemProcessRunner));
        assert_eq!(catalog.roots(), &[PathBuf::from("/opt/BrAutomation")]);
        assert!(catalog.is_strict());
    }

    #[tokio::test]
    async fn test_resolver_on_disk_project() {
        let tmp = TempDir::new().unwrap();
        let fixture = ProjectFixture::new(tmp.path().join("Machine"), "Machine");
        fixture.write_disk().unwrap();

        let mut config = Config::default();
        config.toolchain.installation_roots = vec![tmp.path().join("no-toolchains")];
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).with_config(config);
        let resolver = ctx.build_info_resolver();

        let source = fixture.root().join("Logical/Libraries/MyLib/mylib.c");
        let info = resolver.resolve(&source).await.unwrap();
        assert_eq!(
            info.user_includes[1],
            fixture.root().join("Temp/Includes/Libraries/MyLib")
        );
        assert!(info.compiler_path.is_none());

        let owner = resolver.registry().owner_of(&source).await.unwrap();
        assert_eq!(owner.name, "Machine");
    }
}
