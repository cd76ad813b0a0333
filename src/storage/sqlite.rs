//! SQLite storage implementation
//!
//! This module provides a SQLite-backed `RootStore` that also acts as the
//! sitemap URL sink, so resolved roots and the URLs they yielded live in the
//! same database and survive across runs.

use crate::sitemap::{SitemapEntry, SitemapSink};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RootStore, StorageError, StorageResult};
use crate::storage::SitemapUrlRecord;
use crate::url::UrlRoot;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// SQLite storage backend
///
/// The connection sits behind a mutex so one instance can be shared by all
/// resolving threads. `close` drops the connection; later calls fail with
/// `StorageError::Closed`.
pub struct SqliteStorage {
    conn: Mutex<Option<Connection>>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> StorageResult<T> {
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let conn = guard.as_ref().ok_or(StorageError::Closed)?;
        Ok(f(conn)?)
    }

    /// Forgets every resolved root so the next run resolves them again
    ///
    /// Returns the number of roots removed.
    pub fn clear_resolved_roots(&self) -> StorageResult<usize> {
        self.with_conn(|conn| conn.execute("DELETE FROM resolved_roots", []))
    }

    /// Lists resolved roots, sorted
    pub fn resolved_roots(&self) -> StorageResult<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT root FROM resolved_roots ORDER BY root")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
    }

    /// Inserts or refreshes a sitemap URL
    pub fn upsert_sitemap_url(&self, entry: &SitemapEntry) -> StorageResult<()> {
        let root = UrlRoot::parse(&entry.reference)
            .map(|r| r.to_string())
            .unwrap_or_default();
        let last_modified = entry.last_modified.map(|ts| ts.to_rfc3339());
        let priority = entry.priority.map(f64::from);
        let now = Utc::now().to_rfc3339();

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO sitemap_urls
                    (url, root, last_modified, change_frequency, priority, discovered_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(url) DO UPDATE SET
                    last_modified = excluded.last_modified,
                    change_frequency = excluded.change_frequency,
                    priority = excluded.priority",
                params![
                    entry.reference,
                    root,
                    last_modified,
                    entry.change_frequency,
                    priority,
                    now
                ],
            )
        })?;
        Ok(())
    }

    /// Gets a sitemap URL record by URL
    pub fn get_sitemap_url(&self, url: &str) -> StorageResult<Option<SitemapUrlRecord>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT url, root, last_modified, change_frequency, priority, discovered_at
                 FROM sitemap_urls WHERE url = ?1",
                params![url],
                |row| {
                    Ok(SitemapUrlRecord {
                        url: row.get(0)?,
                        root: row.get(1)?,
                        last_modified: row.get(2)?,
                        change_frequency: row.get(3)?,
                        priority: row.get(4)?,
                        discovered_at: row.get(5)?,
                    })
                },
            )
            .optional()
        })
    }

    /// Counts resolved roots
    pub fn count_resolved_roots(&self) -> StorageResult<u64> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM resolved_roots", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .map(|n| n as u64)
    }

    /// Counts all URLs discovered through sitemaps
    pub fn count_sitemap_urls(&self) -> StorageResult<u64> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM sitemap_urls", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .map(|n| n as u64)
    }

    /// Counts sitemap URLs that carry a last-modified date
    pub fn count_sitemap_urls_with_lastmod(&self) -> StorageResult<u64> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sitemap_urls WHERE last_modified IS NOT NULL",
                [],
                |row| row.get::<_, i64>(0),
            )
        })
        .map(|n| n as u64)
    }

    /// Gets the number of sitemap URLs per root, largest first
    pub fn count_urls_by_root(&self) -> StorageResult<Vec<(String, u64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT root, COUNT(*) AS n FROM sitemap_urls
                 GROUP BY root ORDER BY n DESC, root ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?;
            rows.collect()
        })
    }
}

impl RootStore for SqliteStorage {
    fn is_resolved(&self, root: &UrlRoot) -> StorageResult<bool> {
        let found: Option<i64> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT 1 FROM resolved_roots WHERE root = ?1",
                params![root.as_str()],
                |row| row.get(0),
            )
            .optional()
        })?;
        Ok(found.is_some())
    }

    fn mark_resolved(&self, root: &UrlRoot) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO resolved_roots (root, resolved_at) VALUES (?1, ?2)
                 ON CONFLICT(root) DO UPDATE SET resolved_at = excluded.resolved_at",
                params![root.as_str(), now],
            )
        })?;
        Ok(())
    }

    fn close(&self) -> StorageResult<()> {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match conn {
            Some(conn) => conn.close().map_err(|(_, e)| StorageError::Sqlite(e)),
            None => Ok(()),
        }
    }
}

impl SitemapSink for SqliteStorage {
    fn accept(&self, entry: SitemapEntry) {
        if let Err(e) = self.upsert_sitemap_url(&entry) {
            tracing::error!("Failed to store sitemap URL {}: {}", entry.reference, e);
        }
    }
}
