//! File watching.
//!
//! A [`FileWatcher`] hands out a [`FileWatch`] per watched file. Events are
//! delivered on an unbounded channel; dropping the watch releases whatever
//! the watcher allocated for it.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::trace;

/// Kind of change observed on a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Created,
    Changed,
    Deleted,
}

/// Handle to an active watch on one file.
#[derive(Debug)]
pub struct FileWatch {
    path: PathBuf,
    events: mpsc::UnboundedReceiver<WatchEvent>,
    task: Option<JoinHandle<()>>,
}

impl FileWatch {
    /// Create a watch from an event receiver and an optional driver task.
    ///
    /// The task, if any, is aborted when the watch is dropped.
    pub fn new(
        path: impl Into<PathBuf>,
        events: mpsc::UnboundedReceiver<WatchEvent>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        FileWatch {
            path: path.into(),
            events,
            task,
        }
    }

    /// The watched path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the next event. Returns `None` once the watcher is gone.
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }
}

impl Drop for FileWatch {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Source of file change notifications.
pub trait FileWatcher: Send + Sync {
    /// Start watching a single file. The file does not need to exist yet.
    ///
    /// Must be called from within a tokio runtime.
    fn watch(&self, path: &Path) -> io::Result<FileWatch>;
}

/// Watcher that polls file metadata on a fixed interval.
#[derive(Debug, Clone)]
pub struct PollingWatcher {
    interval: Duration,
}

impl PollingWatcher {
    /// Create a polling watcher with the given interval.
    pub fn new(interval: Duration) -> Self {
        PollingWatcher { interval }
    }
}

impl Default for PollingWatcher {
    fn default() -> Self {
        PollingWatcher::new(Duration::from_secs(1))
    }
}

async fn modified_time(path: &Path) -> Option<SystemTime> {
    let metadata = tokio::fs::metadata(path).await.ok()?;
    metadata.modified().ok().or(Some(SystemTime::UNIX_EPOCH))
}

impl FileWatcher for PollingWatcher {
    fn watch(&self, path: &Path) -> io::Result<FileWatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watched = path.to_path_buf();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut last = modified_time(&watched).await;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = modified_time(&watched).await;
                let event = match (last, current) {
                    (None, Some(_)) => Some(WatchEvent::Created),
                    (Some(_), None) => Some(WatchEvent::Deleted),
                    (Some(a), Some(b)) if a != b => Some(WatchEvent::Changed),
                    _ => None,
                };
                last = current;

                if let Some(event) = event {
                    trace!(path = %watched.display(), ?event, "file watch event");
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Ok(FileWatch::new(path, rx, Some(task)))
    }
}
