//! Per-location failures
//!
//! None of these escape `SitemapResolver::resolve`; they are logged and the
//! next location is attempted.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a `SitemapFetcher`
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Transport(String),
}

/// Why one sitemap location could not be (fully) resolved
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Cannot fetch sitemap: {location} ({source})")]
    Fetch { location: String, source: FetchError },

    #[error("Could not obtain sitemap: {location}. Expected status code 200, but got {status}.")]
    UnexpectedStatus { location: String, status: u16 },

    #[error("Cannot transfer sitemap body: {location} ({source})")]
    Body {
        location: String,
        source: std::io::Error,
    },

    #[error("Cannot stage sitemap {location} in {}: {source}", dir.display())]
    Staging {
        location: String,
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "Cannot parse sitemap: {location} -- Likely an invalid sitemap XML format \
         causing a parsing error (actual error: {source})"
    )]
    Malformed {
        location: String,
        source: quick_xml::Error,
    },
}
