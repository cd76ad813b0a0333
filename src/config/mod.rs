//! Configuration module for Sitemap-Resolver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_resolver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Probing sitemap paths: {:?}", config.sitemap.paths);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, SeedEntry, SitemapConfig, UserAgentConfig,
    DEFAULT_SITEMAP_PATHS, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
