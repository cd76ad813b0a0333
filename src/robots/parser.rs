//! Robots.txt parser implementation
//!
//! This module extracts `Sitemap:` directives using the robotstxt crate's
//! tokenizer.

use robotstxt::{parse_robotstxt, RobotsParseHandler};
use url::Url;

/// Sitemap directives found in a robots.txt file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRobots {
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Parses raw robots.txt content
    ///
    /// `Sitemap:` lines apply to the whole file, whatever user-agent group
    /// they appear in. Relative values are resolved against `base`;
    /// values that still don't form a URL are dropped.
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `base` - URL the file was fetched from
    pub fn from_content(content: &str, base: &str) -> Self {
        let mut collector = SitemapCollector::default();
        parse_robotstxt(content, &mut collector);

        let base = Url::parse(base).ok();
        let mut sitemaps: Vec<String> = Vec::new();
        for value in collector.values {
            let resolved = match Url::parse(&value) {
                Ok(url) => Some(url),
                Err(_) => base.as_ref().and_then(|b| b.join(&value).ok()),
            };

            match resolved {
                Some(url) => {
                    let url = url.to_string();
                    if !sitemaps.contains(&url) {
                        sitemaps.push(url);
                    }
                }
                None => tracing::debug!("Ignoring unusable robots.txt sitemap: {}", value),
            }
        }

        Self { sitemaps }
    }

    /// Returns the sitemap locations, in file order
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    pub fn into_sitemaps(self) -> Vec<String> {
        self.sitemaps
    }
}

#[derive(Default)]
struct SitemapCollector {
    values: Vec<String>,
}

impl RobotsParseHandler for SitemapCollector {
    fn handle_robots_start(&mut self) {}

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.values.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/robots.txt";

    #[test]
    fn test_extract_sitemaps() {
        let content = "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml\n\nUser-agent: BadBot\nDisallow: /\nSitemap: https://example.com/news.xml";
        let robots = ParsedRobots::from_content(content, BASE);
        assert_eq!(
            robots.sitemaps(),
            &[
                "https://example.com/sitemap.xml".to_string(),
                "https://example.com/news.xml".to_string()
            ]
        );
    }

    #[test]
    fn test_directive_is_case_insensitive() {
        let content = "sitemap: https://example.com/a.xml\nSITEMAP: https://example.com/b.xml";
        let robots = ParsedRobots::from_content(content, BASE);
        assert_eq!(robots.sitemaps().len(), 2);
    }

    #[test]
    fn test_relative_sitemap_is_resolved() {
        let content = "Sitemap: /sitemaps/main.xml";
        let robots = ParsedRobots::from_content(content, BASE);
        assert_eq!(robots.sitemaps(), &["https://example.com/sitemaps/main.xml".to_string()]);
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let content = "Sitemap: https://example.com/a.xml\nSitemap: https://example.com/a.xml";
        let robots = ParsedRobots::from_content(content, BASE);
        assert_eq!(robots.into_sitemaps(), vec!["https://example.com/a.xml".to_string()]);
    }

    #[test]
    fn test_no_sitemaps() {
        assert!(ParsedRobots::from_content("User-agent: *\nDisallow: /", BASE)
            .sitemaps()
            .is_empty());
        assert!(ParsedRobots::from_content("", BASE).sitemaps().is_empty());
        assert!(ParsedRobots::from_content("This is not valid robots.txt {{{", BASE)
            .sitemaps()
            .is_empty());
    }
}
