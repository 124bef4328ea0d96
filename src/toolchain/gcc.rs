//! gcc installations bundled with Automation Studio.
//!
//! Each installation lives in `AS/gnuinst/V<x.y.z>` and holds one executable
//! per target machine in its `bin` directory (`i386-elf-gcc.exe`,
//! `arm-eabi-gcc.exe`, ...). A bare `gcc` without a target prefix is asked
//! for its machine and version instead.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use semver::Version;
use serde::Serialize;
use tracing::{debug, warn};

use super::target::{Architecture, SystemGeneration, TargetSystem};
use super::version::{coerce_version, minor_range, sort_newest_first, version_or_default, Versioned};
use crate::util::fs::FileSystem;
use crate::util::process::{ProcessBuilder, ProcessRunner};

static INSTALL_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[Vv](\d+\.\d+(?:\.\d+)?)$").expect("gcc directory pattern is valid")
});

static PREFIXED_EXE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+)-gcc(?:\.exe)?$").expect("gcc executable pattern is valid")
});

static BARE_EXE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^gcc(?:\.exe)?$").expect("gcc executable pattern is valid"));

/// First gcc major version that can report its own default include paths.
const QUERYABLE_MAJOR: u64 = 4;

/// One gcc executable for one target system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GccExecutable {
    /// Path to the executable
    pub path: PathBuf,
    /// Root of the gcc installation the executable belongs to
    pub root_path: PathBuf,
    /// Compiler version
    pub version: Version,
    /// Target machine triple as used in the file name
    pub machine: String,
    /// Target system served
    pub target: TargetSystem,
}

impl Versioned for GccExecutable {
    fn version(&self) -> &Version {
        &self.version
    }
}

impl GccExecutable {
    /// Whether the compiler can be queried for its own defaults.
    pub fn supports_query(&self) -> bool {
        self.version.major >= QUERYABLE_MAJOR
    }

    /// System include directory derived from the installation layout.
    pub fn system_include_dir(&self) -> PathBuf {
        self.root_path.join(&self.machine).join("include")
    }

    /// Total order used to rank candidates: newest first, then target
    /// priority with legacy systems last.
    pub fn best_first(a: &GccExecutable, b: &GccExecutable) -> Ordering {
        b.version
            .cmp(&a.version)
            .then_with(|| a.target.priority_cmp(&b.target))
    }
}

/// A `V<x.y.z>` gcc installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GccInstallation {
    pub version: Version,
    pub root_path: PathBuf,
    pub executables: Vec<GccExecutable>,
}

impl Versioned for GccInstallation {
    fn version(&self) -> &Version {
        &self.version
    }
}

impl GccInstallation {
    /// Version encoded in an installation directory name, if it is one.
    pub fn version_from_dir_name(name: &str) -> Option<String> {
        INSTALL_DIR
            .captures(name)
            .map(|caps| caps[1].to_string())
    }

    /// Load an installation from its root directory.
    pub async fn load(
        fs: &dyn FileSystem,
        runner: &dyn ProcessRunner,
        root: &Path,
        raw_version: &str,
    ) -> Result<Self> {
        let version = version_or_default(raw_version, &root.display().to_string());
        let bin = root.join("bin");
        let entries = fs
            .read_dir(&bin)
            .await
            .with_context(|| format!("failed to list gcc executables in {}", bin.display()))?;

        let mut executables = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            let name = entry.file_name();

            if BARE_EXE.is_match(&name) {
                match probe(runner, &entry.path).await {
                    Ok((machine, probed)) => {
                        executables.extend(executables_for(&entry.path, root, &probed, &machine))
                    }
                    Err(e) => warn!("Skipping {}: {:#}", entry.path.display(), e),
                }
                continue;
            }

            if let Some(caps) = PREFIXED_EXE.captures(&name) {
                let machine = caps[1].to_string();
                let found = executables_for(&entry.path, root, &version, &machine);
                if found.is_empty() {
                    debug!("Ignoring {} with unknown target `{}`", entry.path.display(), machine);
                }
                executables.extend(found);
            }
        }

        if executables.is_empty() {
            bail!("no usable gcc executable in {}", bin.display());
        }
        executables.sort_by(GccExecutable::best_first);
        Ok(GccInstallation {
            version,
            root_path: root.to_path_buf(),
            executables,
        })
    }
}

fn executables_for(
    path: &Path,
    root: &Path,
    version: &Version,
    machine: &str,
) -> Vec<GccExecutable> {
    TargetSystem::for_machine(machine)
        .into_iter()
        .map(|target| GccExecutable {
            path: path.to_path_buf(),
            root_path: root.to_path_buf(),
            version: version.clone(),
            machine: machine.to_string(),
            target,
        })
        .collect()
}

/// Ask a bare gcc for its target machine and version.
async fn probe(runner: &dyn ProcessRunner, exe: &Path) -> Result<(String, Version)> {
    let machine = runner
        .run_stdout(&ProcessBuilder::new(exe).arg("-dumpmachine"))
        .await?;
    let raw = runner
        .run_stdout(&ProcessBuilder::new(exe).arg("-dumpversion"))
        .await?;
    let version = coerce_version(&raw)
        .with_context(|| format!("`{}` is not a gcc version", raw))?;
    Ok((machine, version))
}

/// Discover all gcc installations below an `AS/gnuinst` directory.
pub async fn discover_gcc_installations(
    fs: &dyn FileSystem,
    runner: &dyn ProcessRunner,
    gnuinst: &Path,
) -> Vec<GccInstallation> {
    let entries = match fs.read_dir(gnuinst).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No gcc installations in {}: {}", gnuinst.display(), e);
            return Vec::new();
        }
    };

    let mut installations = Vec::new();
    for entry in entries.iter().filter(|e| e.is_dir) {
        let Some(raw_version) = GccInstallation::version_from_dir_name(&entry.file_name()) else {
            continue;
        };
        match GccInstallation::load(fs, runner, &entry.path, &raw_version).await {
            Ok(installation) => installations.push(installation),
            Err(e) => warn!("Skipping gcc installation {}: {:#}", entry.path.display(), e),
        }
    }

    sort_newest_first(&mut installations);
    installations
}

/// Requested compiler properties. An unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GccRequest {
    pub version: Option<String>,
    pub generation: Option<SystemGeneration>,
    pub architecture: Option<Architecture>,
}

impl GccRequest {
    /// Request a compiler version for a target system.
    pub fn new(version: Option<&str>, target: Option<TargetSystem>) -> Self {
        GccRequest {
            version: version.map(str::to_string),
            generation: target.map(|t| t.generation),
            architecture: target.map(|t| t.architecture),
        }
    }
}

fn best_where<'a>(
    executables: &'a [GccExecutable],
    predicate: impl Fn(&GccExecutable) -> bool,
) -> Option<&'a GccExecutable> {
    executables
        .iter()
        .filter(|e| predicate(e))
        .min_by(|a, b| GccExecutable::best_first(a, b))
}

/// Select the executable best matching a request.
///
/// Candidates matching every requested dimension win. Otherwise a strict
/// policy yields nothing, and a lenient one relaxes to matching only the
/// version, then only the generation, then only the architecture, and
/// finally to the best executable available. An unrequested dimension
/// matches everything in every tier, so a request without a version settles
/// on the best executable as soon as its target misses.
pub fn select_gcc_executable<'a>(
    executables: &'a [GccExecutable],
    request: &GccRequest,
    strict: bool,
) -> Option<&'a GccExecutable> {
    let range = request
        .version
        .as_deref()
        .and_then(coerce_version)
        .map(|v| minor_range(&v));

    let version_ok =
        |e: &GccExecutable| range.as_ref().map_or(true, |r| r.matches(&e.version));
    let generation_ok =
        |e: &GccExecutable| request.generation.map_or(true, |g| e.target.generation == g);
    let architecture_ok =
        |e: &GccExecutable| request.architecture.map_or(true, |a| e.target.architecture == a);

    if let Some(found) =
        best_where(executables, |e| version_ok(e) && generation_ok(e) && architecture_ok(e))
    {
        return Some(found);
    }

    if strict {
        return None;
    }

    best_where(executables, version_ok)
        .or_else(|| best_where(executables, generation_ok))
        .or_else(|| best_where(executables, architecture_ok))
        .or_else(|| best_where(executables, |_| true))
}
