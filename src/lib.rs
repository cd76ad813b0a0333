//! Sitemap-Resolver: sitemap discovery for a polite crawler
//!
//! This crate resolves the sitemaps of every site root a crawl touches,
//! exactly once per root, and feeds the URLs they list to a crawl frontier.
//! Sitemap indexes are followed recursively, the sitemaps.org directory
//! scoping rule is honored, and broken or missing sitemaps never stop a crawl.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Resolver operations
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Cannot use temporary directory {path}: {source}")]
    TempDir {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Sitemap-Resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use sitemap::{ResolutionGuard, SitemapEntry, SitemapResolver, SitemapSink};
pub use url::UrlRoot;
