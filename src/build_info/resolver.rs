//! Build-info resolution.
//!
//! Fragments are produced in a fixed order and merged:
//!
//! 1. project: the generated header root, `-D_DEFAULT_INCLUDES`
//! 2. unit: generated header directories mirroring the unit's logical
//!    position
//! 3. active configuration: declared include directories, common flags and
//!    the flags of the unit's language
//! 4. configuration globals: programs only
//! 5. compiler: executable path, plus a system include directory for
//!    compilers that cannot report their own

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::CBuildInfo;
use crate::core::{Configuration, Project, ProjectPaths, ProjectRegistry, Unit};
use crate::package::{UnitKind, UnitLanguage};
use crate::toolchain::{GccRequest, ToolchainCatalog};
use crate::util::fs::normalize_path;

/// Define added when generated headers carry their default includes.
pub const DEFAULT_INCLUDES_DEFINE: &str = "-D_DEFAULT_INCLUDES";

/// Resolves [`CBuildInfo`] for source files of known projects.
pub struct BuildInfoResolver {
    registry: Arc<ProjectRegistry>,
    catalog: Arc<ToolchainCatalog>,
}

impl BuildInfoResolver {
    pub fn new(registry: Arc<ProjectRegistry>, catalog: Arc<ToolchainCatalog>) -> Self {
        BuildInfoResolver { registry, catalog }
    }

    pub fn registry(&self) -> &Arc<ProjectRegistry> {
        &self.registry
    }

    pub fn catalog(&self) -> &Arc<ToolchainCatalog> {
        &self.catalog
    }

    /// Resolve the build info of a file. `None` if no project owns it.
    pub async fn resolve(&self, path: &Path) -> Option<CBuildInfo> {
        let path = normalize_path(path);
        let project = self.registry.owner_of(&path).await?;
        let unit = project.unit_of(&path);
        let configuration = project.active_configuration();

        debug!(
            project = %project.name,
            unit = unit.map(Unit::name).as_deref().unwrap_or("-"),
            configuration = configuration.map(|c| c.name.as_str()).unwrap_or("-"),
            "Resolving build info for {}",
            path.display()
        );

        let mut fragments = vec![project_fragment(&project)];
        if let Some(unit) = unit {
            fragments.push(unit_fragment(&project.paths, unit));
        }
        if let Some(configuration) = configuration {
            fragments.push(configuration_fragment(
                configuration,
                unit.map(|u| u.language),
            ));
            if unit.is_some_and(|u| u.kind == UnitKind::Program) {
                fragments.push(globals_fragment(&project.paths, configuration));
            }
        }
        fragments.push(self.compiler_fragment(&project, configuration).await);

        Some(CBuildInfo::merge_all(&fragments))
    }

    async fn compiler_fragment(
        &self,
        project: &Project,
        configuration: Option<&Configuration>,
    ) -> CBuildInfo {
        let request = match configuration {
            Some(c) => GccRequest::new(c.compiler_version.as_deref(), Some(c.target_system)),
            None => GccRequest::default(),
        };

        let Some(gcc) = self
            .catalog
            .find_compiler(project.working_version.as_deref(), &request)
            .await
        else {
            debug!("No compiler for {} ({:?})", project.name, request);
            return CBuildInfo::empty();
        };

        let mut fragment = CBuildInfo {
            compiler_path: Some(gcc.path.clone()),
            ..CBuildInfo::default()
        };
        if !gcc.supports_query() {
            fragment.system_includes.push(gcc.system_include_dir());
        }
        fragment
    }
}

/// Generated header root and project-wide defines.
pub fn project_fragment(project: &Project) -> CBuildInfo {
    let mut fragment = CBuildInfo {
        user_includes: vec![project.paths.temp_includes.clone()],
        ..CBuildInfo::default()
    };
    if project.default_includes_in_header {
        fragment.build_options.push(DEFAULT_INCLUDES_DEFINE.to_string());
    }
    fragment
}

/// Generated header directories for a unit.
///
/// IEC units see the headers of every logical level above them, most
/// specific first. C units see the headers generated for their own level.
pub fn unit_fragment(paths: &ProjectPaths, unit: &Unit) -> CBuildInfo {
    let user_includes = match unit.language {
        UnitLanguage::Iec => mirror_chain(paths, &unit.logical_path),
        UnitLanguage::Ansic => vec![paths.mirror_include_dir(&unit.logical_path)],
        UnitLanguage::Binary | UnitLanguage::Other => Vec::new(),
    };
    CBuildInfo {
        user_includes,
        ..CBuildInfo::default()
    }
}

fn mirror_chain(paths: &ProjectPaths, logical_path: &Path) -> Vec<PathBuf> {
    logical_path
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| paths.mirror_include_dir(p))
        .collect()
}

/// Include directories and flags declared by a configuration.
///
/// IEC units get the IEC specific flags; everything else, including files
/// outside any unit, gets the C flags.
pub fn configuration_fragment(
    configuration: &Configuration,
    language: Option<UnitLanguage>,
) -> CBuildInfo {
    let language_options = match language {
        Some(UnitLanguage::Iec) => &configuration.iec_build_options,
        _ => &configuration.ansic_build_options,
    };
    let mut build_options = configuration.build_options.clone();
    build_options.extend(language_options.iter().cloned());
    build_options.push(configuration.target_system.generation.define().to_string());

    CBuildInfo {
        user_includes: configuration.include_directories.clone(),
        build_options,
        ..CBuildInfo::default()
    }
}

/// Generated global declarations of a configuration.
pub fn globals_fragment(paths: &ProjectPaths, configuration: &Configuration) -> CBuildInfo {
    CBuildInfo {
        user_includes: vec![paths.configuration_globals_dir(&configuration.name)],
        ..CBuildInfo::default()
    }
}
