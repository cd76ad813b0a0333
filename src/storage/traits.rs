//! Storage traits and error types
//!
//! This module defines the trait interface for the persisted record of
//! resolved site roots and associated error types.

use crate::url::UrlRoot;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage has been closed")]
    Closed,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persisted record of site roots whose sitemaps have been resolved
///
/// Implementations are shared by every crawl worker, so all methods take
/// `&self` and must be thread-safe. The record may outlive a process: a
/// root resolved by a previous run reads as resolved on first reference.
pub trait RootStore: Send + Sync {
    /// Returns true if sitemaps were already resolved for `root`
    fn is_resolved(&self, root: &UrlRoot) -> StorageResult<bool>;

    /// Records that sitemaps were fully resolved for `root`
    fn mark_resolved(&self, root: &UrlRoot) -> StorageResult<()>;

    /// Releases the underlying resource
    ///
    /// Closing twice is not an error. Other calls made after closing
    /// return `StorageError::Closed`.
    fn close(&self) -> StorageResult<()>;
}
