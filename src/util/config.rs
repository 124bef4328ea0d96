//! Configuration file support for brtools.
//!
//! brtools reads two configuration file locations:
//! - Global: `~/.brtools/config.toml` - User-wide defaults
//! - Workspace: `.brtools/config.toml` - Workspace-specific overrides
//!
//! Workspace config takes precedence over global config. The
//! `BRTOOLS_INSTALL_ROOTS` environment variable replaces the configured
//! installation roots.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `toolchain.installation-roots`.
pub const INSTALL_ROOTS_ENV: &str = "BRTOOLS_INSTALL_ROOTS";

/// brtools configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain discovery settings
    pub toolchain: ToolchainSettings,

    /// Project discovery settings
    pub project: ProjectSettings,

    /// File watch settings
    pub watch: WatchSettings,
}

/// Toolchain discovery and matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Directories containing `AS<version>` installations (e.g. C:/BrAutomation)
    pub installation_roots: Vec<PathBuf>,

    /// Refuse toolchains that do not satisfy the requested versions
    /// instead of falling back to the newest available one
    pub strict_version_matching: Option<bool>,
}

/// Project discovery settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectSettings {
    /// How many directory levels below a workspace folder to search for
    /// project files
    pub search_depth: Option<usize>,
}

/// File watch settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct WatchSettings {
    /// Polling interval for user settings files
    pub poll_interval_ms: Option<u64>,
}

impl Config {
    /// Default search depth below a workspace folder.
    pub const DEFAULT_SEARCH_DEPTH: usize = 4;

    /// Default settings file polling interval.
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or is invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if !other.toolchain.installation_roots.is_empty() {
            self.toolchain.installation_roots = other.toolchain.installation_roots;
        }
        if other.toolchain.strict_version_matching.is_some() {
            self.toolchain.strict_version_matching = other.toolchain.strict_version_matching;
        }
        if other.project.search_depth.is_some() {
            self.project.search_depth = other.project.search_depth;
        }
        if other.watch.poll_interval_ms.is_some() {
            self.watch.poll_interval_ms = other.watch.poll_interval_ms;
        }
    }

    /// Apply the environment override for installation roots.
    pub fn apply_env(&mut self, install_roots: Option<&std::ffi::OsStr>) {
        if let Some(value) = install_roots {
            let roots: Vec<PathBuf> = std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !roots.is_empty() {
                self.toolchain.installation_roots = roots;
            }
        }
    }

    /// Installation roots to scan, with the platform default when none are
    /// configured.
    pub fn installation_roots(&self) -> Vec<PathBuf> {
        if self.toolchain.installation_roots.is_empty() {
            default_installation_roots()
        } else {
            self.toolchain.installation_roots.clone()
        }
    }

    /// Whether version matching is strict.
    pub fn strict_version_matching(&self) -> bool {
        self.toolchain.strict_version_matching.unwrap_or(false)
    }

    /// Project file search depth.
    pub fn search_depth(&self) -> usize {
        self.project
            .search_depth
            .unwrap_or(Self::DEFAULT_SEARCH_DEPTH)
    }

    /// Settings file polling interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(
            self.watch
                .poll_interval_ms
                .unwrap_or(Self::DEFAULT_POLL_INTERVAL_MS),
        )
    }
}

/// Default installation roots for the host platform.
pub fn default_installation_roots() -> Vec<PathBuf> {
    if cfg!(windows) {
        vec![PathBuf::from(r"C:\BrAutomation")]
    } else {
        Vec::new()
    }
}

/// Load merged configuration from global and workspace locations.
///
/// Order of precedence (highest to lowest):
/// 1. `BRTOOLS_INSTALL_ROOTS` (installation roots only)
/// 2. Workspace config (.brtools/config.toml)
/// 3. Global config (~/.brtools/config.toml)
/// 4. Defaults
pub fn load_config(global_path: Option<&Path>, workspace_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }

    config.merge(Config::load_or_default(workspace_path));
    config.apply_env(std::env::var_os(INSTALL_ROOTS_ENV).as_deref());
    config
}

/// Get the global brtools config directory (~/.brtools).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".brtools"))
}

/// Get the global config path (~/.brtools/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the workspace config path (.brtools/config.toml).
pub fn workspace_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".brtools").join("config.toml")
}
