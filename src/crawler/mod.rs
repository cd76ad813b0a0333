//! Crawler module for sitemap fetching and run coordination
//!
//! This module contains the outer crawling logic, including:
//! - HTTP fetching for sitemaps and robots.txt
//! - Seed planning by site root
//! - Overall run coordination over worker threads

mod coordinator;
mod fetcher;

pub use coordinator::{plan_roots, run_resolution, Coordinator, RootPlan, RunSummary};
pub use fetcher::{build_http_client, user_agent, HttpFetcher};
