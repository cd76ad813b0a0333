use crate::url::UrlRoot;
use std::collections::BTreeSet;

/// Builds the set of sitemap locations to try for `root`
///
/// Start-URL sitemaps are authoritative: when `is_start_urls` is set only the
/// explicit locations are returned and `paths` is ignored. Otherwise the
/// explicit locations are joined by `root + path` for every configured path.
/// Blank entries are skipped.
///
/// # Arguments
///
/// * `explicit` - Locations supplied by the caller (seed sitemaps, robots.txt)
/// * `root` - Site root the locations belong to
/// * `paths` - Configured relative sitemap paths
/// * `is_start_urls` - Whether `explicit` came from start-URL seeds
///
/// # Returns
///
/// The deduplicated locations, in a stable order
pub fn collect_locations(
    explicit: &[String],
    root: &UrlRoot,
    paths: &[String],
    is_start_urls: bool,
) -> BTreeSet<String> {
    let mut locations: BTreeSet<String> = explicit
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    if !is_start_urls {
        locations.extend(
            paths
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .map(|p| root.join_path(p)),
        );
    }

    locations
}
