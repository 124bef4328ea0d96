//! Project registry.
//!
//! Finds the projects below the workspace folders, keeps them loaded and
//! answers which project and unit a file belongs to. The scan is memoized:
//! concurrent callers share one scan, and an explicit rescan replaces the
//! whole [`ProjectSet`], releasing the file watches of the old one.

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::logical::Unit;
use super::project::Project;
use crate::util::config::Config;
use crate::util::fs::{normalize_path, FileSystem};
use crate::util::scan_cache::ScanCache;
use crate::util::watch::FileWatcher;

/// Project file extension.
pub const PROJECT_FILE_EXTENSION: &str = "apj";

/// Directories never searched for project files.
const SKIPPED_DIRS: &[&str] = &["Temp", "Binaries", "Logical", "Physical", "node_modules"];

/// The projects found by one scan, with their settings watches.
#[derive(Debug)]
pub struct ProjectSet {
    projects: Vec<Arc<Project>>,
    watches: Mutex<Vec<JoinHandle<()>>>,
}

impl ProjectSet {
    fn new(projects: Vec<Arc<Project>>, watches: Vec<JoinHandle<()>>) -> Self {
        ProjectSet {
            projects,
            watches: Mutex::new(watches),
        }
    }

    /// Loaded projects, ordered by project file path.
    pub fn projects(&self) -> &[Arc<Project>] {
        &self.projects
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The project owning a path.
    ///
    /// The project with the longest root containing the path wins, so a
    /// project nested inside another owns its own files. Files of referenced
    /// units outside every project root belong to the referencing project.
    pub fn owner_of(&self, path: &Path) -> Option<&Arc<Project>> {
        let path = normalize_path(path);
        let by_root = self
            .projects
            .iter()
            .filter(|p| p.contains(&path))
            .max_by_key(|p| p.root().components().count());
        if by_root.is_some() {
            return by_root;
        }

        self.projects
            .iter()
            .filter_map(|p| p.unit_of(&path).map(|u| (p, u.root_path.components().count())))
            .max_by_key(|(_, depth)| *depth)
            .map(|(p, _)| p)
    }

    /// Stop watching settings files. Safe to call more than once.
    pub fn dispose(&self) {
        let mut watches = self.watches.lock().unwrap_or_else(|e| e.into_inner());
        if watches.is_empty() {
            return;
        }
        debug!("Releasing {} settings watch(es)", watches.len());
        for task in watches.drain(..) {
            task.abort();
        }
    }

    /// Whether no watches are active anymore.
    pub fn is_disposed(&self) -> bool {
        self.watches
            .lock()
            .map(|w| w.is_empty())
            .unwrap_or(true)
    }
}

impl Drop for ProjectSet {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Memoized set of projects below the workspace folders.
pub struct ProjectRegistry {
    fs: Arc<dyn FileSystem>,
    watcher: Arc<dyn FileWatcher>,
    folders: RwLock<Vec<PathBuf>>,
    search_depth: usize,
    cache: ScanCache<ProjectSet>,
}

impl ProjectRegistry {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        watcher: Arc<dyn FileWatcher>,
        folders: Vec<PathBuf>,
        search_depth: usize,
    ) -> Self {
        ProjectRegistry {
            fs,
            watcher,
            folders: RwLock::new(folders),
            search_depth,
            cache: ScanCache::new(),
        }
    }

    /// Create a registry using the configured search depth.
    pub fn with_config(
        fs: Arc<dyn FileSystem>,
        watcher: Arc<dyn FileWatcher>,
        folders: Vec<PathBuf>,
        config: &Config,
    ) -> Self {
        Self::new(fs, watcher, folders, config.search_depth())
    }

    /// Workspace folders currently searched.
    pub fn workspace_folders(&self) -> Vec<PathBuf> {
        self.folders
            .read()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// The current project set, scanning on first use.
    pub async fn projects(&self) -> Arc<ProjectSet> {
        self.cache.get_or_scan(|| self.scan()).await
    }

    /// Scan again and dispose the previous project set.
    pub async fn rescan(&self) -> Arc<ProjectSet> {
        let (previous, current) = self.cache.rescan(|| self.scan()).await;
        if let Some(previous) = previous {
            previous.dispose();
        }
        current
    }

    /// Replace the workspace folders and rescan.
    pub async fn set_workspace_folders(&self, folders: Vec<PathBuf>) -> Arc<ProjectSet> {
        match self.folders.write() {
            Ok(mut current) => *current = folders,
            Err(e) => *e.into_inner() = folders,
        }
        self.rescan().await
    }

    /// The project owning a path.
    pub async fn owner_of(&self, path: &Path) -> Option<Arc<Project>> {
        self.projects().await.owner_of(path).cloned()
    }

    /// The project and unit owning a path.
    pub async fn unit_of(&self, path: &Path) -> Option<(Arc<Project>, Unit)> {
        let project = self.owner_of(path).await?;
        let unit = project.unit_of(&normalize_path(path))?.clone();
        Some((project, unit))
    }

    async fn scan(&self) -> ProjectSet {
        let folders = self.workspace_folders();

        let mut files = BTreeSet::new();
        for folder in &folders {
            files.extend(find_project_files(self.fs.as_ref(), folder, self.search_depth).await);
        }

        let mut projects = Vec::new();
        let mut watches = Vec::new();
        for file in files {
            match Project::load(self.fs.as_ref(), &file).await {
                Ok(project) => {
                    let project = Arc::new(project);
                    if let Some(task) = self.watch_settings(&project) {
                        watches.push(task);
                    }
                    projects.push(project);
                }
                Err(e) => warn!("Skipping project {}: {:#}", file.display(), anyhow::Error::new(e)),
            }
        }

        info!("Found {} project(s) in {} folder(s)", projects.len(), folders.len());
        ProjectSet::new(projects, watches)
    }

    fn watch_settings(&self, project: &Arc<Project>) -> Option<JoinHandle<()>> {
        let settings = &project.paths.user_settings;
        let mut watch = match self.watcher.watch(settings) {
            Ok(watch) => watch,
            Err(e) => {
                warn!("Cannot watch {}: {}", settings.display(), e);
                return None;
            }
        };

        let project = Arc::clone(project);
        let fs = Arc::clone(&self.fs);
        Some(tokio::spawn(async move {
            while let Some(event) = watch.next_event().await {
                debug!(?event, "{} changed", watch.path().display());
                project.refresh_active_configuration(fs.as_ref()).await;
            }
        }))
    }
}

/// Find project files below a folder, at most `depth` levels deep.
pub async fn find_project_files(fs: &dyn FileSystem, folder: &Path, depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([(folder.to_path_buf(), 0usize)]);

    while let Some((dir, level)) = queue.pop_front() {
        let entries = match fs.read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list {}: {}", dir.display(), e);
                continue;
            }
        };

        for entry in entries {
            let name = entry.file_name();
            if entry.is_dir {
                let skipped = name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str());
                if !skipped && level < depth {
                    queue.push_back((entry.path, level + 1));
                }
            } else if entry
                .path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case(PROJECT_FILE_EXTENSION))
            {
                found.push(normalize_path(&entry.path));
            }
        }
    }

    found
}
