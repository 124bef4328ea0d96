//! A loaded Automation Studio project.

use std::path::Path;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

use super::configuration::Configuration;
use super::logical::{LogicalView, Unit};
use super::paths::ProjectPaths;
use crate::package::{PackageError, ProjectFile, UserSettings};
use crate::util::fs::FileSystem;

/// Error loading a project. Fatal for that project only.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("invalid project file")]
    ProjectFile(#[source] PackageError),

    #[error("invalid logical view")]
    LogicalView(#[source] PackageError),
}

/// The project graph: metadata, logical view and configurations.
#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub description: Option<String>,
    /// `Project@Version`
    pub version: Option<String>,
    /// Required Automation Studio version
    pub working_version: Option<String>,
    /// Generated headers include their default includes
    pub default_includes_in_header: bool,
    pub paths: ProjectPaths,
    pub logical: LogicalView,
    /// Configurations in `Physical.pkg` order
    pub configurations: Vec<Configuration>,
    active: watch::Sender<Option<String>>,
}

impl Project {
    /// Load a project from its project file.
    pub async fn load(fs: &dyn FileSystem, project_file: &Path) -> Result<Project, ProjectError> {
        let paths = ProjectPaths::new(project_file);
        let file = ProjectFile::load(fs, project_file)
            .await
            .map_err(ProjectError::ProjectFile)?;
        let logical = LogicalView::discover(fs, &paths)
            .await
            .map_err(ProjectError::LogicalView)?;
        let configurations = Configuration::load_all(fs, &paths).await;

        let settings = read_settings(fs, &paths.user_settings).await;
        let active = derive_active_configuration(settings.as_ref(), &configurations);
        let (active, _) = watch::channel(active);

        info!(
            "Loaded project {} ({} unit(s), {} configuration(s))",
            file.name,
            logical.units.len(),
            configurations.len()
        );

        Ok(Project {
            name: file.name,
            description: file.description,
            version: file.version,
            working_version: file.working_version,
            default_includes_in_header: file.default_includes_in_header,
            paths,
            logical,
            configurations,
            active,
        })
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    /// Project file path.
    pub fn project_file(&self) -> &Path {
        &self.paths.project_file
    }

    /// Whether a path lies inside the project root.
    pub fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.paths.root)
    }

    pub fn configuration(&self, name: &str) -> Option<&Configuration> {
        self.configurations.iter().find(|c| c.name == name)
    }

    /// Name of the active configuration.
    pub fn active_configuration_name(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    /// The active configuration.
    pub fn active_configuration(&self) -> Option<&Configuration> {
        let name = self.active.borrow();
        name.as_deref().and_then(|n| self.configuration(n))
    }

    /// Listen for active configuration changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.active.subscribe()
    }

    /// Re-read the user settings and update the active configuration.
    ///
    /// Returns whether the active configuration changed. Subscribers are
    /// only notified on change.
    pub async fn refresh_active_configuration(&self, fs: &dyn FileSystem) -> bool {
        let settings = read_settings(fs, &self.paths.user_settings).await;
        let derived = derive_active_configuration(settings.as_ref(), &self.configurations);
        let changed = self.active.send_if_modified(|current| {
            if *current == derived {
                false
            } else {
                *current = derived.clone();
                true
            }
        });
        if changed {
            info!(
                "Active configuration of {} is now {}",
                self.name,
                derived.as_deref().unwrap_or("<none>")
            );
        }
        changed
    }

    /// The unit containing a path.
    pub fn unit_of(&self, path: &Path) -> Option<&Unit> {
        self.logical.unit_of(path)
    }
}

async fn read_settings(fs: &dyn FileSystem, path: &Path) -> Option<UserSettings> {
    if !fs.exists(path).await {
        return None;
    }
    match UserSettings::load(fs, path).await {
        Ok(settings) => Some(settings),
        Err(e) => {
            debug!("Ignoring user settings: {}", e);
            None
        }
    }
}

/// Pick the active configuration.
///
/// The configuration named in the user settings wins if it exists;
/// otherwise the first configuration is active.
pub fn derive_active_configuration(
    settings: Option<&UserSettings>,
    configurations: &[Configuration],
) -> Option<String> {
    let declared = settings.and_then(|s| s.active_configuration.as_deref());
    if let Some(name) = declared {
        if configurations.iter().any(|c| c.name == name) {
            return Some(name.to_string());
        }
        debug!("Active configuration {} does not exist", name);
    }
    configurations.first().map(|c| c.name.clone())
}
