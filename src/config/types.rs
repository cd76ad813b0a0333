use serde::Deserialize;
use std::path::PathBuf;

/// Relative sitemap paths probed on every root that has no start-URL sitemaps
pub const DEFAULT_SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml"];

/// Default number of resolving worker threads
pub const DEFAULT_WORKERS: usize = 4;

/// Main configuration structure for Sitemap-Resolver
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sitemap: SitemapConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
    #[serde(rename = "seed", default)]
    pub seeds: Vec<SeedEntry>,
}

/// Sitemap resolution behavior
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct SitemapConfig {
    /// Relative paths tried on each root (e.g. "/sitemap.xml")
    #[serde(default = "default_sitemap_paths")]
    pub paths: Vec<String>,

    /// Accept sitemap URLs outside the sitemap's own directory
    #[serde(default)]
    pub lenient: bool,

    /// Where sitemap bodies are staged before parsing (system temp dir if unset)
    #[serde(rename = "temp-dir", default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            paths: default_sitemap_paths(),
            lenient: false,
            temp_dir: None,
        }
    }
}

fn default_sitemap_paths() -> Vec<String> {
    DEFAULT_SITEMAP_PATHS.iter().map(|p| p.to_string()).collect()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Coordinator behavior
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of worker threads resolving roots concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Read `Sitemap:` directives from each root's robots.txt
    #[serde(default = "default_robots")]
    pub robots: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            robots: true,
        }
    }
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_robots() -> bool {
    true
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// A site to resolve
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    /// Any URL on the site; only its root matters
    pub url: String,

    /// Start-URL sitemaps; when present, configured paths are not probed
    #[serde(default)]
    pub sitemaps: Vec<String>,
}
