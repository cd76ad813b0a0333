//! Resolution coordinator - drives sitemap resolution for every seed
//!
//! This module contains the main loop that coordinates a resolution run,
//! including:
//! - Opening storage and optionally forgetting previously resolved roots
//! - Grouping seeds by site root
//! - Fanning seeds out over a pool of worker threads
//! - Reading robots.txt sitemap directives
//! - Handling stop requests

use crate::config::{Config, SeedEntry};
use crate::crawler::HttpFetcher;
use crate::robots::fetch_sitemap_directives;
use crate::sitemap::{
    ResolutionGuard, SitemapEntry, SitemapFetcher, SitemapResolver, SitemapSink,
    StopSignal,
};
use crate::storage::{RootStore, SqliteStorage};
use crate::url::UrlRoot;
use crate::{ResolverError, Result};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::ScopedJoinHandle;
use std::time::{Duration, Instant};

/// What to resolve for one site root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPlan {
    pub root: UrlRoot,

    /// Explicit sitemap locations from the seeds of this root
    pub sitemaps: Vec<String>,

    /// True when `sitemaps` are start-URL sitemaps; path probing and
    /// robots.txt are then skipped for the root
    pub is_start_urls: bool,
}

/// Groups seeds by root, keeping the order roots first appear in
///
/// The explicit sitemaps of all seeds sharing a root are merged.
pub fn plan_roots(seeds: &[SeedEntry]) -> Result<Vec<RootPlan>> {
    let mut plans: Vec<RootPlan> = Vec::new();

    for seed in seeds {
        let root = UrlRoot::parse(&seed.url)?;
        let index = match plans.iter().position(|p| p.root == root) {
            Some(index) => index,
            None => {
                plans.push(RootPlan {
                    root,
                    sitemaps: Vec::new(),
                    is_start_urls: false,
                });
                plans.len() - 1
            }
        };

        let plan = &mut plans[index];
        for sitemap in &seed.sitemaps {
            if !plan.sitemaps.contains(sitemap) {
                plan.sitemaps.push(sitemap.clone());
            }
        }
        plan.is_start_urls = !plan.sitemaps.is_empty();
    }

    Ok(plans)
}

/// Outcome of a resolution run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of seeds processed
    pub seeds: usize,
    /// Number of distinct roots
    pub roots: usize,
    /// URLs handed to storage during this run
    pub urls_emitted: u64,
    /// Whether a stop request cut the run short
    pub interrupted: bool,
    pub elapsed: Duration,
}

/// Main resolution coordinator
pub struct Coordinator {
    config: Config,
    storage: Arc<SqliteStorage>,
    fetcher: Arc<dyn SitemapFetcher>,
    resolver: SitemapResolver,
    plans: Vec<RootPlan>,
    /// Plan index for every seed, in seed order
    jobs: Vec<usize>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The resolver configuration
    /// * `fresh` - Whether to forget previously resolved roots first
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ResolverError)` - Failed to initialize
    pub fn new(config: Config, fresh: bool) -> Result<Self> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

        if fresh {
            let cleared = storage.clear_resolved_roots()?;
            tracing::info!("Fresh run: forgot {} resolved roots", cleared);
        }

        let fetcher = HttpFetcher::from_config(&config.user_agent)?;

        Self::with_parts(config, Arc::new(storage), Arc::new(fetcher))
    }

    /// Creates a coordinator from already built storage and transport
    pub fn with_parts(
        config: Config,
        storage: Arc<SqliteStorage>,
        fetcher: Arc<dyn SitemapFetcher>,
    ) -> Result<Self> {
        let store: Arc<dyn RootStore> = storage.clone();
        let guard = Arc::new(ResolutionGuard::new(store));
        let resolver = SitemapResolver::new(config.sitemap.clone(), fetcher.clone(), guard)?;

        let plans = plan_roots(&config.seeds)?;
        let mut jobs = Vec::with_capacity(config.seeds.len());
        for seed in &config.seeds {
            let root = UrlRoot::parse(&seed.url)?;
            if let Some(index) = plans.iter().position(|p| p.root == root) {
                jobs.push(index);
            }
        }

        Ok(Self {
            config,
            storage,
            fetcher,
            resolver,
            plans,
            jobs,
        })
    }

    pub fn storage(&self) -> &Arc<SqliteStorage> {
        &self.storage
    }

    /// Returns the guard, for stopping the run from another thread
    pub fn stop_handle(&self) -> Arc<ResolutionGuard> {
        self.resolver.guard().clone()
    }

    /// Stops the run: no new location is started, and the store is closed
    pub fn stop(&self) {
        self.resolver.stop();
    }

    /// Runs every seed through the resolver
    ///
    /// Seeds are queued in order and drained by `crawler.workers` threads.
    /// Seeds sharing a root race through the resolution guard, which lets
    /// one of them resolve the root.
    pub fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();
        let sink = CountingSink::new(self.storage.as_ref());

        let queue: Mutex<VecDeque<&RootPlan>> =
            Mutex::new(self.jobs.iter().map(|&i| &self.plans[i]).collect());
        let workers = self.config.crawler.workers.clamp(1, self.jobs.len().max(1));

        tracing::info!(
            "Resolving sitemaps for {} seeds ({} roots) with {} workers",
            self.jobs.len(),
            self.plans.len(),
            workers
        );

        let queue = &queue;
        let sink = &sink;
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|id| s.spawn(move || self.work(id, queue, sink)))
                .collect();

            join_workers(handles)
        })?;

        let summary = RunSummary {
            seeds: self.jobs.len(),
            roots: self.plans.len(),
            urls_emitted: sink.count(),
            interrupted: self.resolver.guard().is_stop_requested(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Resolution finished: {} URLs from {} roots in {:?}{}",
            summary.urls_emitted,
            summary.roots,
            summary.elapsed,
            if summary.interrupted { " (interrupted)" } else { "" }
        );

        Ok(summary)
    }

    fn work(&self, id: usize, queue: &Mutex<VecDeque<&RootPlan>>, sink: &dyn SitemapSink) {
        loop {
            if self.resolver.guard().is_stop_requested() {
                tracing::debug!("Worker {} stopping", id);
                return;
            }

            let next = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(plan) = next else {
                return;
            };

            tracing::trace!("Worker {} picked {}", id, plan.root);
            self.resolve_root(plan, sink);
        }
    }

    fn resolve_root(&self, plan: &RootPlan, sink: &dyn SitemapSink) {
        let read_robots = !plan.is_start_urls && self.config.crawler.robots;

        self.resolver
            .resolve_with(&plan.root, sink, plan.is_start_urls, || {
                let mut explicit = plan.sitemaps.clone();
                if read_robots {
                    explicit.extend(fetch_sitemap_directives(self.fetcher.as_ref(), &plan.root));
                }
                explicit
            });
    }
}

/// Joins every worker, then reports how many of them panicked
fn join_workers(handles: Vec<ScopedJoinHandle<'_, ()>>) -> Result<()> {
    let panicked = handles
        .into_iter()
        .map(|handle| handle.join())
        .filter(|joined| joined.is_err())
        .count();

    if panicked > 0 {
        return Err(ResolverError::Worker(format!(
            "{} worker thread(s) panicked",
            panicked
        )));
    }
    Ok(())
}

/// Sink that forwards to storage and counts what passes through
struct CountingSink<'a> {
    inner: &'a dyn SitemapSink,
    count: AtomicU64,
}

impl<'a> CountingSink<'a> {
    fn new(inner: &'a dyn SitemapSink) -> Self {
        Self {
            inner,
            count: AtomicU64::new(0),
        }
    }

    fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl SitemapSink for CountingSink<'_> {
    fn accept(&self, entry: SitemapEntry) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.inner.accept(entry);
    }
}

/// Runs a complete resolution
///
/// # Arguments
///
/// * `config` - The resolver configuration
/// * `fresh` - Whether to forget previously resolved roots first
///
/// # Example
///
/// ```no_run
/// use sitemap_resolver::config::load_config;
/// use sitemap_resolver::crawler::run_resolution;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_resolution(config, false)?;
/// println!("{} URLs", summary.urls_emitted);
/// # Ok(())
/// # }
/// ```
pub fn run_resolution(config: Config, fresh: bool) -> Result<RunSummary> {
    let coordinator = Coordinator::new(config, fresh)?;
    coordinator.run()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(url: &str, sitemaps: &[&str]) -> SeedEntry {
        SeedEntry {
            url: url.to_string(),
            sitemaps: sitemaps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_plan_roots_groups_by_root() {
        let plans = plan_roots(&[
            seed("https://a.com/x", &[]),
            seed("https://b.com/", &[]),
            seed("https://A.com:443/y", &[]),
        ])
        .unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].root.as_str(), "https://a.com");
        assert_eq!(plans[1].root.as_str(), "https://b.com");
        assert!(!plans[0].is_start_urls);
    }

    #[test]
    fn test_plan_roots_merges_start_sitemaps() {
        let plans = plan_roots(&[
            seed("https://a.com/", &[]),
            seed("https://a.com/docs", &["https://a.com/docs/sitemap.xml"]),
            seed("https://a.com/blog", &["https://a.com/blog/sitemap.xml", "https://a.com/docs/sitemap.xml"]),
        ])
        .unwrap();

        assert_eq!(plans.len(), 1);
        assert!(plans[0].is_start_urls);
        assert_eq!(
            plans[0].sitemaps,
            vec!["https://a.com/docs/sitemap.xml", "https://a.com/blog/sitemap.xml"]
        );
    }

    #[test]
    fn test_join_workers_reports_every_panic() {
        let finished = AtomicU64::new(0);

        let result = std::thread::scope(|s| {
            let handles = vec![
                s.spawn(|| panic!("first worker")),
                s.spawn(|| {
                    finished.fetch_add(1, Ordering::SeqCst);
                }),
                s.spawn(|| panic!("second worker")),
            ];
            join_workers(handles)
        });

        assert_eq!(finished.load(Ordering::SeqCst), 1);
        match result {
            Err(ResolverError::Worker(msg)) => assert!(msg.starts_with("2 ")),
            other => panic!("expected worker error, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_roots_rejects_bad_url() {
        assert!(matches!(
            plan_roots(&[seed("not a url", &[])]),
            Err(ResolverError::Url(_))
        ));
    }
}
