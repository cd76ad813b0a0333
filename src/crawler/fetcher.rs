//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for sitemap resolution, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests for sitemaps and robots.txt
//! - Redirect handling
//! - Error classification

use crate::config::UserAgentConfig;
use crate::sitemap::{FetchError, FetchResponse, SitemapFetcher};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;

/// Maximum number of redirects followed for one location
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with proper configuration
///
/// The client is blocking: sitemap resolution runs on plain worker threads
/// and must not be called from inside an async runtime.
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_resolver::config::UserAgentConfig;
/// use sitemap_resolver::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SitemapBot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent string
///
/// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// `SitemapFetcher` backed by a blocking reqwest client
///
/// Every status code is handed back as is; only transport failures become
/// errors.
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any HTTP response | `Ok(FetchResponse)` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused, DNS, TLS | `FetchError::Connect` |
/// | Redirect loop, too many redirects, other | `FetchError::Transport` |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a fetcher with the configured user agent
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

impl SitemapFetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<FetchResponse, FetchError> {
        let response = self.client.get(location).send().map_err(classify_error)?;

        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        tracing::trace!(
            "Fetched {} (status {}, content type {:?})",
            location,
            status_code,
            content_type
        );

        Ok(FetchResponse::new(status_code, content_type, response))
    }
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}
