//! Consolidated C build information for a source file.
//!
//! Build metadata is declared at several levels of a project (project file,
//! unit position, active configuration, configuration globals, compiler).
//! Each level contributes a [`CBuildInfo`] fragment; fragments are merged in
//! a fixed order into the result handed to editors and language servers.

pub mod resolver;

use std::path::PathBuf;

use serde::Serialize;

pub use resolver::BuildInfoResolver;

/// Compiler, include paths and flags for compiling one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CBuildInfo {
    /// Compiler executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_path: Option<PathBuf>,
    /// Include directories the compiler would search by itself
    pub system_includes: Vec<PathBuf>,
    /// Project include directories, most specific first
    pub user_includes: Vec<PathBuf>,
    /// Additional compiler arguments
    pub build_options: Vec<String>,
}

impl CBuildInfo {
    /// Create an empty fragment.
    pub fn empty() -> Self {
        CBuildInfo::default()
    }

    /// Merge another fragment into this one.
    ///
    /// Lists are appended in order; a compiler path in `other` replaces
    /// this one.
    pub fn merge(&mut self, other: &CBuildInfo) {
        if other.compiler_path.is_some() {
            self.compiler_path.clone_from(&other.compiler_path);
        }
        self.system_includes.extend(other.system_includes.iter().cloned());
        self.user_includes.extend(other.user_includes.iter().cloned());
        self.build_options.extend(other.build_options.iter().cloned());
    }

    /// Merge fragments left to right.
    pub fn merge_all<'a>(fragments: impl IntoIterator<Item = &'a CBuildInfo>) -> CBuildInfo {
        fragments
            .into_iter()
            .fold(CBuildInfo::empty(), |mut acc, fragment| {
                acc.merge(fragment);
                acc
            })
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.compiler_path.is_none()
            && self.system_includes.is_empty()
            && self.user_includes.is_empty()
            && self.build_options.is_empty()
    }
}
