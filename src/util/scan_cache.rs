//! Memoization of one in-flight scan per scope.
//!
//! A [`ScanCache`] is either empty, holds a scan that is still running, or
//! holds its finished value. Callers that arrive while a scan is running
//! await the same handle instead of starting a second scan. A rescan swaps in
//! a fresh handle; readers still awaiting the old one get the old result.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

/// Cache slot for a shared scan result.
#[derive(Debug)]
pub struct ScanCache<T> {
    slot: Mutex<Option<Arc<OnceCell<Arc<T>>>>>,
}

impl<T> Default for ScanCache<T> {
    fn default() -> Self {
        ScanCache {
            slot: Mutex::new(None),
        }
    }
}

impl<T> ScanCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value, joining or starting a scan as needed.
    pub async fn get_or_scan<F, Fut>(&self, scan: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = {
            let mut slot = self.slot.lock().await;
            Arc::clone(slot.get_or_insert_with(|| Arc::new(OnceCell::new())))
        };
        Self::await_cell(&cell, scan).await
    }

    /// Replace the cached handle with a fresh scan.
    ///
    /// Returns the previous value if it had finished, so the caller can
    /// release resources it owns, together with the new value.
    pub async fn rescan<F, Fut>(&self, scan: F) -> (Option<Arc<T>>, Arc<T>)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let cell = Arc::new(OnceCell::new());
        let previous = {
            let mut slot = self.slot.lock().await;
            slot.replace(Arc::clone(&cell))
        };
        let previous = previous.and_then(|old| old.get().cloned());
        let value = Self::await_cell(&cell, scan).await;
        (previous, value)
    }

    async fn await_cell<F, Fut>(cell: &OnceCell<Arc<T>>, scan: F) -> Arc<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let value = cell.get_or_init(|| async move { Arc::new(scan().await) }).await;
        Arc::clone(value)
    }
}
