//! Recursive sitemap resolution for one site root
//!
//! `SitemapResolver::resolve` is the entry point crawl workers call. It
//! claims the root through the shared `ResolutionGuard`, collects candidate
//! locations and walks them depth-first. Sitemap indexes recurse through the
//! parser's visitor. A visited set, private to one `resolve` call, ends
//! cycles and refetches.

use crate::config::SitemapConfig;
use crate::sitemap::error::SitemapError;
use crate::sitemap::guard::{ResolutionGuard, StopSignal};
use crate::sitemap::locations::collect_locations;
use crate::sitemap::parser::{parse_sitemap, ParseOutcome, SitemapVisitor};
use crate::sitemap::staging::{SitemapFetcher, Staged, Stager};
use crate::sitemap::{SitemapEntry, SitemapSink};
use crate::url::{ScopeFilter, UrlRoot};
use crate::{ResolverError, Result};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Resolves the sitemaps of site roots and emits their URLs to a sink
pub struct SitemapResolver {
    config: SitemapConfig,
    scope: ScopeFilter,
    stager: Stager,
    guard: Arc<ResolutionGuard>,
}

impl SitemapResolver {
    /// Creates a resolver
    ///
    /// # Arguments
    ///
    /// * `config` - Sitemap paths, scoping mode and temp directory
    /// * `fetcher` - Transport used for every location
    /// * `guard` - Guard shared with every other resolver of the crawl
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapResolver)` - Ready to resolve
    /// * `Err(ResolverError::TempDir)` - The temp directory cannot be created
    pub fn new(
        config: SitemapConfig,
        fetcher: Arc<dyn SitemapFetcher>,
        guard: Arc<ResolutionGuard>,
    ) -> Result<Self> {
        let temp_dir = config
            .temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        std::fs::create_dir_all(&temp_dir).map_err(|source| ResolverError::TempDir {
            path: temp_dir.clone(),
            source,
        })?;

        Ok(Self {
            scope: ScopeFilter::new(config.lenient),
            stager: Stager::new(fetcher, temp_dir),
            config,
            guard,
        })
    }

    pub fn guard(&self) -> &Arc<ResolutionGuard> {
        &self.guard
    }

    /// Resolves the sitemaps of `root` unless another call already did or
    /// is doing it
    ///
    /// Never fails: every per-location problem is logged and the next
    /// location is tried. The root is recorded as resolved only when the
    /// walk ran to the end without a stop request.
    ///
    /// # Arguments
    ///
    /// * `root` - Site root being crawled
    /// * `explicit` - Known sitemap locations for the root
    /// * `sink` - Receives every in-scope URL
    /// * `is_start_urls` - `explicit` are start-URL sitemaps; skip path probing
    pub fn resolve(
        &self,
        root: &UrlRoot,
        explicit: &[String],
        sink: &dyn SitemapSink,
        is_start_urls: bool,
    ) {
        self.resolve_with(root, sink, is_start_urls, || explicit.to_vec());
    }

    /// Same as `resolve`, but the explicit locations are only computed once
    /// this call has claimed the root
    ///
    /// Use it when finding the locations costs a request, as reading
    /// robots.txt does, so losers of the race never pay for it.
    pub fn resolve_with<F>(
        &self,
        root: &UrlRoot,
        sink: &dyn SitemapSink,
        is_start_urls: bool,
        explicit: F,
    ) where
        F: FnOnce() -> Vec<String>,
    {
        let Some(claim) = self.guard.try_enter(root) else {
            return;
        };

        let explicit = explicit();
        let locations = collect_locations(&explicit, root, &self.config.paths, is_start_urls);
        if locations.is_empty() {
            tracing::debug!("No sitemap locations to try for {}", root);
        }

        let mut visited = HashSet::new();
        for location in &locations {
            self.resolve_location(location, sink, &mut visited);
        }

        if self.guard.is_stop_requested() {
            tracing::info!("Sitemap resolution interrupted for {}", root);
            return;
        }

        claim.finish();
        tracing::info!(
            "Sitemaps resolved for {} ({} locations visited)",
            root,
            visited.len()
        );
    }

    /// Requests every resolution sharing this resolver's guard to stop
    pub fn stop(&self) {
        self.guard.shutdown();
    }

    fn resolve_location(
        &self,
        location: &str,
        sink: &dyn SitemapSink,
        visited: &mut HashSet<String>,
    ) {
        if visited.contains(location) {
            tracing::trace!("Sitemap location already visited: {}", location);
            return;
        }
        if self.guard.is_stop_requested() {
            tracing::debug!(
                "Skipping resolution of sitemap location (stop requested): {}",
                location
            );
            return;
        }
        visited.insert(location.to_string());

        tracing::info!("Resolving sitemap: {}", location);

        let staged = match self.stager.stage(location) {
            Ok(Staged::File(staged)) => staged,
            Ok(Staged::NotFound) => {
                tracing::debug!("Sitemap not found : {}", location);
                return;
            }
            Err(e) => {
                tracing::error!("{}", e);
                return;
            }
        };

        let reader = match staged.reader() {
            Ok(reader) => reader,
            Err(source) => {
                let e = SitemapError::Body {
                    location: location.to_string(),
                    source,
                };
                tracing::error!("{}", e);
                return;
            }
        };

        let mut descent = Descent {
            resolver: self,
            sink,
            visited,
        };

        match parse_sitemap(reader, location, self.scope, &*self.guard, &mut descent) {
            Ok(summary) if summary.outcome == ParseOutcome::Completed => {
                tracing::debug!(
                    "Sitemap parsed: {} ({} URLs, {} out of scope, {} child sitemaps)",
                    location,
                    summary.emitted,
                    summary.out_of_scope,
                    summary.child_sitemaps
                );
            }
            Ok(_) => {}
            Err(source) => {
                let e = SitemapError::Malformed {
                    location: location.to_string(),
                    source,
                };
                tracing::error!("{}", e);
            }
        }
    }
}

impl fmt::Debug for SitemapResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SitemapResolver")
            .field("config", &self.config)
            .field("temp_dir", &self.stager.temp_dir())
            .finish_non_exhaustive()
    }
}

/// Resolvers compare by configuration; the guard and transport are ignored
impl PartialEq for SitemapResolver {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

impl Eq for SitemapResolver {}

impl Hash for SitemapResolver {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.config.hash(state);
    }
}

/// Parser visitor that follows sitemap index children depth-first
struct Descent<'r> {
    resolver: &'r SitemapResolver,
    sink: &'r dyn SitemapSink,
    visited: &'r mut HashSet<String>,
}

impl SitemapVisitor for Descent<'_> {
    fn child_sitemap(&mut self, location: &str) {
        self.resolver
            .resolve_location(location, self.sink, self.visited);
    }

    fn entry(&mut self, entry: SitemapEntry) {
        self.sink.accept(entry);
    }
}
