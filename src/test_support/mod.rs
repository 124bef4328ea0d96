//! Test utilities and mocks for brtools unit tests.
//!
//! This module provides mock implementations for the interfaces the project
//! model and toolchain catalog are written against: filesystem access,
//! process execution and file watching.
//!
//! # Example
//!
//! ```rust,ignore
//! use brtools::test_support::{MockFileSystem, MockExecutor, MockProcessOutput};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let fs = MockFileSystem::new();
//!     fs.add_file("/ws/P/P.apj", "<Project />");
//!
//!     let exec = MockExecutor::new();
//!     exec.expect("/AS/gnuinst/V6.3.0/bin/gcc -dumpversion", MockProcessOutput::success("6.3.0"));
//!
//!     // Use mocks in tests...
//! }
//! ```

pub mod fixtures;

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::util::fs::{DirEntry, FileSystem};
use crate::util::process::{ProcessBuilder, ProcessOutput, ProcessRunner};
use crate::util::watch::{FileWatch, FileWatcher, WatchEvent};

// Re-export fixtures for convenience
pub use fixtures::*;

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("not found: {}", path.display()),
    )
}

/// Mock filesystem for testing without real I/O.
///
/// An in-memory tree shared between the test and the code under test.
/// Mutation goes through `&self` so the same instance can be handed out
/// behind an `Arc` and changed while a scan result is alive.
#[derive(Debug, Default)]
pub struct MockFileSystem {
    files: Mutex<BTreeMap<PathBuf, String>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MockFileSystem {
    /// Create a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        self.files.lock().unwrap().insert(path, content.into());
    }

    /// Add a directory and all of its parents.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().remove(path).is_some()
    }

    /// Remove a directory and everything below it.
    pub fn remove_dir_all(&self, path: &Path) {
        self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
        self.dirs.lock().unwrap().retain(|d| !d.starts_with(path));
    }

    /// Check if a path is a file.
    pub fn is_file(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    /// All file paths, sorted (for debugging).
    pub fn all_files(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl FileSystem for MockFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        if !self.dirs.lock().unwrap().contains(path) {
            return Err(not_found(path));
        }

        let mut entries: Vec<DirEntry> = self
            .dirs
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.parent() == Some(path))
            .map(|d| DirEntry {
                path: d.clone(),
                is_dir: true,
            })
            .collect();
        entries.extend(
            self.files
                .lock()
                .unwrap()
                .keys()
                .filter(|f| f.parent() == Some(path))
                .map(|f| DirEntry {
                    path: f.clone(),
                    is_dir: false,
                }),
        );
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.dirs.lock().unwrap().contains(path)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        self.dirs.lock().unwrap().contains(path)
    }
}

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

impl From<MockProcessOutput> for ProcessOutput {
    fn from(output: MockProcessOutput) -> Self {
        ProcessOutput {
            status: Some(output.status),
            stdout: output.stdout,
            stderr: output.stderr,
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// Mock process executor for testing command execution.
///
/// Records the commands it is asked to run and answers from a list of
/// expectations. Unmatched commands fail like a missing executable would.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Mutex<Vec<(CommandPattern, MockProcessOutput)>>,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    /// Add an expectation for an arbitrary pattern.
    pub fn expect_pattern(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.expectations.lock().unwrap().push((pattern, output));
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, cmd: &str) -> Result<MockProcessOutput> {
        self.calls.lock().unwrap().push(cmd.to_string());
        let expectations = self.expectations.lock().unwrap();
        match expectations.iter().find(|(pattern, _)| pattern.matches(cmd)) {
            Some((_, output)) => Ok(output.clone()),
            None => bail!("unexpected command: {}", cmd),
        }
    }
}

#[async_trait]
impl ProcessRunner for MockExecutor {
    async fn run(&self, process: &ProcessBuilder) -> Result<ProcessOutput> {
        self.respond(&process.display_command()).map(Into::into)
    }
}

/// File watcher driven by the test.
///
/// Every watch gets its own channel; [`ManualWatcher::emit`] delivers an
/// event to all live watches of a path.
#[derive(Debug, Default)]
pub struct ManualWatcher {
    watches: Mutex<Vec<(PathBuf, mpsc::UnboundedSender<WatchEvent>)>>,
}

impl ManualWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send an event to the watches of `path`. Returns how many received it.
    pub fn emit(&self, path: &Path, event: WatchEvent) -> usize {
        self.watches
            .lock()
            .unwrap()
            .iter()
            .filter(|(watched, _)| watched == path)
            .filter(|(_, tx)| tx.send(event).is_ok())
            .count()
    }

    /// Number of watches whose handle is still alive.
    pub fn active_watches(&self) -> usize {
        self.watches
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

impl FileWatcher for ManualWatcher {
    fn watch(&self, path: &Path) -> io::Result<FileWatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watches.lock().unwrap().push((path.to_path_buf(), tx));
        Ok(FileWatch::new(path, rx, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_filesystem_basic() {
        let fs = MockFileSystem::new();
        fs.add_file("/project/P.apj", "<Project />");
        fs.add_dir("/project/Temp");

        assert!(fs.exists(Path::new("/project")).await);
        assert!(fs.is_dir(Path::new("/project/Temp")).await);
        assert!(!fs.is_dir(Path::new("/project/P.apj")).await);
        assert!(!fs.exists(Path::new("/project/nonexistent")).await);
        assert_eq!(
            fs.read_to_string(Path::new("/project/P.apj")).await.unwrap(),
            "<Project />"
        );

        let names: Vec<String> = fs
            .read_dir(Path::new("/project"))
            .await
            .unwrap()
            .iter()
            .map(DirEntry::file_name)
            .collect();
        assert_eq!(names, ["P.apj", "Temp"]);
        assert!(fs.read_dir(Path::new("/missing")).await.is_err());

        assert!(fs.remove_file(Path::new("/project/P.apj")));
        assert!(!fs.exists(Path::new("/project/P.apj")).await);
    }

    #[tokio::test]
    async fn test_mock_executor() {
        let exec = MockExecutor::new();
        exec.expect("gcc -dumpversion", MockProcessOutput::success("6.3.0\n"));
        exec.expect_prefix("false", MockProcessOutput::failure(1, "boom"));

        let version = exec
            .run_stdout(&ProcessBuilder::new("gcc").arg("-dumpversion"))
            .await
            .unwrap();
        assert_eq!(version, "6.3.0");

        assert!(exec.run_stdout(&ProcessBuilder::new("false")).await.is_err());
        assert!(exec.run(&ProcessBuilder::new("unknown")).await.is_err());
        assert_eq!(exec.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_manual_watcher() {
        let watcher = ManualWatcher::new();
        let mut watch = watcher.watch(Path::new("/p/LastUser.set")).unwrap();
        assert_eq!(watcher.active_watches(), 1);

        assert_eq!(watcher.emit(Path::new("/p/LastUser.set"), WatchEvent::Changed), 1);
        assert_eq!(watcher.emit(Path::new("/p/Other"), WatchEvent::Changed), 0);
        assert_eq!(watch.next_event().await, Some(WatchEvent::Changed));

        drop(watch);
        assert_eq!(watcher.active_watches(), 0);
    }
}
