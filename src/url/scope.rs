/// Returns the directory portion of a sitemap location
///
/// Everything up to and including the final `/`. For
/// `https://x.com/a/sitemap.xml` this is `https://x.com/a/`.
pub fn location_directory(location: &str) -> &str {
    match location.rfind('/') {
        Some(idx) => &location[..=idx],
        None => "",
    }
}

/// Sitemaps.org directory scoping rule
///
/// A sitemap may only vouch for URLs in its own directory subtree. In
/// lenient mode the restriction is lifted and every present reference
/// passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ScopeFilter {
    lenient: bool,
}

impl ScopeFilter {
    pub fn new(lenient: bool) -> Self {
        Self { lenient }
    }

    /// Checks whether `reference` may be emitted on behalf of the sitemap
    /// found at `declaring_location`
    pub fn passes(&self, reference: &str, declaring_location: &str) -> bool {
        if self.lenient {
            return true;
        }

        let directory = location_directory(declaring_location);
        if reference.starts_with(directory) {
            return true;
        }

        tracing::debug!(
            "Sitemap URL out of scope for location directory. URL: {}  Location directory: {}",
            reference,
            directory
        );
        false
    }
}
