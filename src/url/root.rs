use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Identity of a site: scheme, host and port
///
/// Two URLs belong to the same root when their ASCII origins are equal, so
/// `https://Example.com:443/a` and `https://example.com/b` share the root
/// `https://example.com`. Sitemap resolution is tracked per root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlRoot(String);

impl UrlRoot {
    /// Parses any absolute http(s) URL and keeps only its root
    ///
    /// # Examples
    ///
    /// ```
    /// use sitemap_resolver::url::UrlRoot;
    ///
    /// let root = UrlRoot::parse("https://EXAMPLE.com:443/docs/page").unwrap();
    /// assert_eq!(root.as_str(), "https://example.com");
    ///
    /// let root = UrlRoot::parse("http://example.com:8080/").unwrap();
    /// assert_eq!(root.as_str(), "http://example.com:8080");
    /// ```
    pub fn parse(url_str: &str) -> UrlResult<Self> {
        let url = Url::parse(url_str.trim())
            .map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;
        Self::from_url(&url)
    }

    /// Extracts the root of an already parsed URL
    pub fn from_url(url: &Url) -> UrlResult<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingHost(url.to_string()));
        }

        Ok(Self(url.origin().ascii_serialization()))
    }

    /// Returns the root as `scheme://host[:port]`, without a trailing slash
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds an absolute location from a path relative to this root
    ///
    /// A missing leading `/` is added, so `sitemap.xml` and `/sitemap.xml`
    /// produce the same location.
    pub fn join_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.0, path)
        } else {
            format!("{}/{}", self.0, path)
        }
    }

    /// Returns true if `location` lives under this root
    pub fn contains(&self, location: &str) -> bool {
        Self::parse(location).map(|r| r == *self).unwrap_or(false)
    }
}

impl fmt::Display for UrlRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
