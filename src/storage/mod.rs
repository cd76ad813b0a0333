//! Storage module for persisting resolution state
//!
//! This module handles the record of resolved site roots and the URLs that
//! sitemaps yielded, including:
//! - SQLite database initialization and schema management
//! - The `RootStore` trait the resolution guard consults
//! - An in-memory store for ephemeral runs

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryRootStore;
pub use sqlite::SqliteStorage;
pub use traits::{RootStore, StorageError, StorageResult};

/// Represents a sitemap-discovered URL in the database
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrlRecord {
    pub url: String,
    pub root: String,
    pub last_modified: Option<String>,
    pub change_frequency: Option<String>,
    pub priority: Option<f64>,
    pub discovered_at: String,
}
