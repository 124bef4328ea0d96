//! Filesystem utilities.
//!
//! The project model never touches `std::fs` directly. Everything goes
//! through [`FileSystem`] so scans can run against an in-memory tree in tests
//! and suspend cooperatively on a single-threaded runtime in production.
//!
//! The pure helpers at the bottom of this module are shared by every format
//! reader: Windows-to-portable path conversion, lexical normalization,
//! reference path resolution and shell-style flag splitting.

use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

/// A single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry
    pub path: PathBuf,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl DirEntry {
    /// File name of the entry, lossily converted.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read-only filesystem operations used by scans.
#[async_trait]
pub trait FileSystem: Send + Sync + fmt::Debug {
    /// Read a whole file as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// List the immediate entries of a directory, sorted by path.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Check whether a file or directory exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Check whether a path is a directory.
    async fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
            entries.push(DirEntry {
                path: entry.path(),
                is_dir,
            });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

/// Read a file to string, with nice error messages.
pub async fn read_to_string(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    fs.read_to_string(path)
        .await
        .with_context(|| format!("failed to read file: {}", path.display()))
}

/// Convert a path written with native Windows separators to forward slashes.
pub fn to_portable_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

/// Lexically normalize a path, folding `.` and `..` components.
///
/// The filesystem is not consulted, so the path does not need to exist.
/// A `..` that would climb above the root of an absolute path is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether a portable path carries a drive letter (`C:/...`) or UNC prefix.
fn is_drive_or_unc(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    drive || path.starts_with("//")
}

/// Resolve a project-root-relative path as written in package files.
///
/// A leading single separator (`\Logical\Libs`) means "relative to the
/// project root"; drive-letter and UNC values are absolute. Package files
/// are written on Windows, so a POSIX-style `/opt/Lib` is still taken as
/// root-relative.
pub fn resolve_from_root(project_root: &Path, path: &str) -> PathBuf {
    let portable = to_portable_path(path);
    if is_drive_or_unc(&portable) {
        return normalize_path(Path::new(&portable));
    }
    let relative = portable.trim_start_matches('/');
    normalize_path(&project_root.join(relative))
}

/// Split a comma-separated include directory list and resolve each entry
/// against the project root.
pub fn split_include_dirs(project_root: &Path, list: &str) -> Vec<PathBuf> {
    list.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| resolve_from_root(project_root, s))
        .collect()
}

/// Split a flag string the way a shell would.
///
/// Whitespace separates tokens; single and double quotes group. Inside
/// double quotes a backslash escapes only `"` and `\`; everywhere else a
/// backslash is literal so Windows paths survive.
pub fn split_shell_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '"' => {
                in_token = true;
                while let Some(q) = chars.next() {
                    match q {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            if let Some(escaped) = chars.next() {
                                current.push(escaped);
                            }
                        }
                        _ => current.push(q),
                    }
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        args.push(current);
    }
    args
}
