//! Statistics generation from the resolution database
//!
//! This module provides functionality for extracting and displaying
//! resolution statistics from the storage layer.

use crate::storage::{SqliteStorage, StorageResult};

/// Resolution statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionStatistics {
    /// Number of roots whose sitemaps were fully resolved
    pub resolved_roots: u64,

    /// Total number of URLs discovered through sitemaps
    pub total_urls: u64,

    /// URLs that carried a last-modified date
    pub urls_with_lastmod: u64,

    /// URL count per root, largest first
    pub urls_by_root: Vec<(String, u64)>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ResolutionStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<ResolutionStatistics> {
    Ok(ResolutionStatistics {
        resolved_roots: storage.count_resolved_roots()?,
        total_urls: storage.count_sitemap_urls()?,
        urls_with_lastmod: storage.count_sitemap_urls_with_lastmod()?,
        urls_by_root: storage.count_urls_by_root()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ResolutionStatistics) {
    println!("=== Sitemap Statistics ===\n");

    println!("Overview:");
    println!("  Resolved roots: {}", stats.resolved_roots);
    println!("  Sitemap URLs: {}", stats.total_urls);
    println!(
        "  With last-modified date: {} ({:.1}%)",
        stats.urls_with_lastmod,
        percentage(stats.urls_with_lastmod, stats.total_urls)
    );
    println!();

    if !stats.urls_by_root.is_empty() {
        println!("URLs by Root:");
        for (root, count) in &stats.urls_by_root {
            println!(
                "  {}: {} ({:.1}%)",
                root,
                count,
                percentage(*count, stats.total_urls)
            );
        }
        println!();
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::{SitemapEntry, SitemapSink};
    use crate::storage::RootStore;
    use crate::url::UrlRoot;

    #[test]
    fn test_load_statistics() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .mark_resolved(&UrlRoot::parse("https://a.com").unwrap())
            .unwrap();
        storage.accept(SitemapEntry::new("https://a.com/1"));
        storage.accept(SitemapEntry::new("https://a.com/2"));
        storage.accept(SitemapEntry::new("https://b.com/1"));

        let stats = load_statistics(&storage).unwrap();

        assert_eq!(stats.resolved_roots, 1);
        assert_eq!(stats.total_urls, 3);
        assert_eq!(stats.urls_with_lastmod, 0);
        assert_eq!(stats.urls_by_root[0], ("https://a.com".to_string(), 2));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
