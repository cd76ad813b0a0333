//! Sitemap module for Sitemap-Resolver
//!
//! This module resolves the sitemaps of a site root, including:
//! - The per-root resolution guard shared by all crawl workers
//! - Candidate location collection
//! - Fetching and staging sitemap bodies (with gzip support)
//! - Streaming XML parsing of URL sets and sitemap indexes
//! - Recursive resolution with cycle detection

mod entry;
mod error;
mod guard;
mod locations;
mod parser;
mod resolver;
mod staging;

pub use entry::{parse_lastmod, parse_priority, SitemapEntry};
pub use error::{FetchError, SitemapError};
pub use guard::{ActiveRoot, ResolutionGuard, RootState, StopSignal};
pub use locations::collect_locations;
pub use parser::{parse_sitemap, ParseOutcome, ParseSummary, SitemapVisitor};
pub use resolver::SitemapResolver;
pub use staging::{FetchResponse, SitemapFetcher, StagedSitemap, Staged, Stager};

use std::sync::{Mutex, PoisonError};

/// Destination of the URLs sitemaps announce (the crawl frontier)
pub trait SitemapSink: Send + Sync {
    fn accept(&self, entry: SitemapEntry);
}

/// Sink that keeps every entry in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<SitemapEntry>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the entries received so far, in arrival order
    pub fn entries(&self) -> Vec<SitemapEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn into_entries(self) -> Vec<SitemapEntry> {
        self.entries
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SitemapEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SitemapSink for CollectingSink {
    fn accept(&self, entry: SitemapEntry) {
        self.lock().push(entry);
    }
}
