//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sitemap-Resolver
//! database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Site roots whose sitemaps were fully resolved
CREATE TABLE IF NOT EXISTS resolved_roots (
    root TEXT PRIMARY KEY,
    resolved_at TEXT NOT NULL
);

-- URLs discovered through sitemaps
CREATE TABLE IF NOT EXISTS sitemap_urls (
    url TEXT PRIMARY KEY,
    root TEXT NOT NULL,
    last_modified TEXT,
    change_frequency TEXT,
    priority REAL,
    discovered_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_sitemap_urls_root ON sitemap_urls(root);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
