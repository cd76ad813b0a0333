//! In-memory root store
//!
//! Used for ephemeral runs and tests where nothing should survive the
//! process.

use crate::storage::traits::{RootStore, StorageError, StorageResult};
use crate::url::UrlRoot;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Inner {
    resolved: HashSet<UrlRoot>,
    closed: bool,
}

/// Thread-safe, non-persistent `RootStore`
#[derive(Debug, Default)]
pub struct MemoryRootStore {
    inner: Mutex<Inner>,
}

impl MemoryRootStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already knows the given roots as resolved
    ///
    /// Simulates a record persisted by an earlier run.
    pub fn with_resolved<I>(roots: I) -> Self
    where
        I: IntoIterator<Item = UrlRoot>,
    {
        Self {
            inner: Mutex::new(Inner {
                resolved: roots.into_iter().collect(),
                closed: false,
            }),
        }
    }

    /// Returns true once `close` has been called
    pub fn is_closed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
    }
}

impl RootStore for MemoryRootStore {
    fn is_resolved(&self, root: &UrlRoot) -> StorageResult<bool> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.closed {
            return Err(StorageError::Closed);
        }
        Ok(inner.resolved.contains(root))
    }

    fn mark_resolved(&self, root: &UrlRoot) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.closed {
            return Err(StorageError::Closed);
        }
        inner.resolved.insert(root.clone());
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed = true;
        Ok(())
    }
}
