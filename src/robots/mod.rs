//! Robots.txt handling module
//!
//! Sites announce their sitemaps with `Sitemap:` directives in robots.txt.
//! This module fetches a root's robots.txt and extracts those locations.

mod parser;

pub use parser::ParsedRobots;

use crate::sitemap::SitemapFetcher;
use crate::url::UrlRoot;
use std::io::Read;

/// Fetches robots.txt for a root and returns the sitemaps it declares
///
/// Anything other than a readable 200 response yields no locations; a
/// missing or broken robots.txt never stops resolution.
///
/// # Arguments
///
/// * `fetcher` - Transport used for the request
/// * `root` - The site root whose robots.txt is read
///
/// # Returns
///
/// The declared sitemap locations, possibly empty
pub fn fetch_sitemap_directives(fetcher: &dyn SitemapFetcher, root: &UrlRoot) -> Vec<String> {
    let location = root.join_path("/robots.txt");

    let response = match fetcher.fetch(&location) {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Cannot fetch {}: {}", location, e);
            return Vec::new();
        }
    };

    if response.status_code != 200 {
        tracing::debug!(
            "No robots.txt sitemaps for {} (status {})",
            root,
            response.status_code
        );
        return Vec::new();
    }

    let mut content = String::new();
    let mut body = response.body;
    if let Err(e) = body.read_to_string(&mut content) {
        tracing::warn!("Cannot read {}: {}", location, e);
        return Vec::new();
    }

    let sitemaps = ParsedRobots::from_content(&content, &location).into_sitemaps();
    tracing::debug!("{} sitemap(s) declared in {}", sitemaps.len(), location);
    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sitemap::{FetchError, FetchResponse};
    use std::io::Cursor;

    struct RobotsFetcher {
        status: u16,
        body: &'static str,
    }

    impl SitemapFetcher for RobotsFetcher {
        fn fetch(&self, location: &str) -> Result<FetchResponse, FetchError> {
            assert_eq!(location, "https://example.com/robots.txt");
            Ok(FetchResponse::new(
                self.status,
                Some("text/plain".to_string()),
                Cursor::new(self.body.as_bytes().to_vec()),
            ))
        }
    }

    struct FailingFetcher;

    impl SitemapFetcher for FailingFetcher {
        fn fetch(&self, _location: &str) -> Result<FetchResponse, FetchError> {
            Err(FetchError::Timeout)
        }
    }

    fn root() -> UrlRoot {
        UrlRoot::parse("https://example.com/some/page").unwrap()
    }

    #[test]
    fn test_fetch_sitemap_directives() {
        let fetcher = RobotsFetcher {
            status: 200,
            body: "User-agent: *\nSitemap: https://example.com/sitemap.xml",
        };
        assert_eq!(
            fetch_sitemap_directives(&fetcher, &root()),
            vec!["https://example.com/sitemap.xml".to_string()]
        );
    }

    #[test]
    fn test_non_200_yields_nothing() {
        let fetcher = RobotsFetcher {
            status: 404,
            body: "Sitemap: https://example.com/sitemap.xml",
        };
        assert!(fetch_sitemap_directives(&fetcher, &root()).is_empty());
    }

    #[test]
    fn test_transport_failure_yields_nothing() {
        assert!(fetch_sitemap_directives(&FailingFetcher, &root()).is_empty());
    }
}
