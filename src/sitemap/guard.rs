//! Per-root resolution guard
//!
//! Crawl workers trigger sitemap resolution whenever they meet a site root,
//! so several threads can race for the same root. The guard lets exactly
//! one of them through and remembers, through the `RootStore`, which roots
//! are done.

use crate::storage::RootStore;
use crate::url::UrlRoot;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Cooperative cancellation flag, polled by long-running work
pub trait StopSignal: Send + Sync {
    fn is_stop_requested(&self) -> bool;
}

/// Lifecycle of one site root's sitemap resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootState {
    Unresolved,
    /// A thread is resolving the root right now
    Active,
    Resolved,
}

/// Admits at most one resolution per site root at a time
///
/// Share one instance (behind an `Arc`) between every worker thread; the
/// dedup guarantee only holds among callers of the same guard.
pub struct ResolutionGuard {
    store: Arc<dyn RootStore>,
    roots: Mutex<Roots>,
    stopped: AtomicBool,
}

#[derive(Debug, Default)]
struct Roots {
    active: HashSet<UrlRoot>,
    /// Roots finished through this guard; still answerable once the store
    /// is closed
    finished: HashSet<UrlRoot>,
}

impl ResolutionGuard {
    pub fn new(store: Arc<dyn RootStore>) -> Self {
        Self {
            store,
            roots: Mutex::new(Roots::default()),
            stopped: AtomicBool::new(false),
        }
    }

    /// Claims `root` for resolution
    ///
    /// Returns `None` when the root is being resolved by another thread, has
    /// already been resolved, or the guard is shut down. Otherwise the root
    /// is marked active until the returned token is finished or dropped.
    pub fn try_enter(&self, root: &UrlRoot) -> Option<ActiveRoot<'_>> {
        if self.is_stop_requested() {
            tracing::debug!("Not resolving sitemaps for {} (stop requested)", root);
            return None;
        }

        let mut roots = self.roots.lock().unwrap_or_else(PoisonError::into_inner);
        if roots.active.contains(root)
            || roots.finished.contains(root)
            || self.is_resolved_in_store(root)
        {
            tracing::trace!(
                "Sitemap locations were already processed or are being processed for URL root: {}",
                root
            );
            return None;
        }
        roots.active.insert(root.clone());

        Some(ActiveRoot {
            guard: self,
            root: root.clone(),
            finished: false,
        })
    }

    /// Reports where `root` stands
    ///
    /// After `shutdown` the store is closed and no longer consulted: only
    /// roots finished through this guard read as `Resolved`, every other
    /// inactive root reads as `Unresolved`.
    pub fn state(&self, root: &UrlRoot) -> RootState {
        let roots = self.roots.lock().unwrap_or_else(PoisonError::into_inner);
        if roots.active.contains(root) {
            RootState::Active
        } else if roots.finished.contains(root) {
            RootState::Resolved
        } else if self.is_stop_requested() {
            RootState::Unresolved
        } else if self.is_resolved_in_store(root) {
            RootState::Resolved
        } else {
            RootState::Unresolved
        }
    }

    /// Raises the stop flag and closes the root store
    ///
    /// Calling it again does nothing.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Sitemap resolution stop requested");
        if let Err(e) = self.store.close() {
            tracing::error!("Could not close resolved-root store: {}", e);
        }
    }

    fn is_resolved_in_store(&self, root: &UrlRoot) -> bool {
        match self.store.is_resolved(root) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!("Cannot read resolution state of {}: {}", root, e);
                false
            }
        }
    }

    fn release(&self, root: &UrlRoot, resolved: bool) {
        let mut roots = self.roots.lock().unwrap_or_else(PoisonError::into_inner);
        if resolved {
            if let Err(e) = self.store.mark_resolved(root) {
                tracing::error!("Could not record {} as resolved: {}", root, e);
            }
            roots.finished.insert(root.clone());
        }
        roots.active.remove(root);
    }
}

impl StopSignal for ResolutionGuard {
    fn is_stop_requested(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Claim on a site root returned by `ResolutionGuard::try_enter`
///
/// Dropping it without calling `finish` releases the root unresolved, so a
/// cancelled or panicking resolution never leaves the root stuck active.
pub struct ActiveRoot<'g> {
    guard: &'g ResolutionGuard,
    root: UrlRoot,
    finished: bool,
}

impl ActiveRoot<'_> {
    pub fn root(&self) -> &UrlRoot {
        &self.root
    }

    /// Records the root as resolved and releases it
    pub fn finish(mut self) {
        self.finished = true;
        self.guard.release(&self.root, true);
    }
}

impl Drop for ActiveRoot<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("Releasing {} without marking it resolved", self.root);
            self.guard.release(&self.root, false);
        }
    }
}
