//! Sitemap resolution over HTTP

use crate::common::{file_count, gzip, sitemap_config, sitemap_index, urlset, user_agent_config};
use sitemap_resolver::crawler::HttpFetcher;
use sitemap_resolver::sitemap::{CollectingSink, ResolutionGuard, RootState, SitemapResolver};
use sitemap_resolver::storage::MemoryRootStore;
use sitemap_resolver::url::UrlRoot;
use std::path::Path;
use std::sync::{Arc, Barrier};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_resolver(temp_dir: &Path) -> SitemapResolver {
    let fetcher = Arc::new(HttpFetcher::from_config(&user_agent_config()).unwrap());
    let guard = Arc::new(ResolutionGuard::new(Arc::new(MemoryRootStore::new())));
    SitemapResolver::new(sitemap_config(temp_dir), fetcher, guard).unwrap()
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/xml")
}

#[tokio::test]
async fn test_index_with_plain_and_gzip_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(sitemap_index(&[
            format!("{}/pages.xml", base_url),
            format!("{}/posts.xml.gz", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pages.xml"))
        .respond_with(xml(urlset(&[
            (format!("{}/about", base_url), Some("2024-01-15")),
            (format!("{}/contact", base_url), None),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/posts.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                gzip(&urlset(&[(
                    format!("{}/posts/hello", base_url),
                    Some("2024-02-01T08:00:00+00:00"),
                )])),
                "application/gzip",
            ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let staging = temp_dir.path().to_path_buf();
    let root = UrlRoot::parse(&base_url).unwrap();

    let (entries, state) = tokio::task::spawn_blocking(move || {
        let resolver = http_resolver(&staging);
        let sink = CollectingSink::new();
        resolver.resolve(&root, &[], &sink, false);
        (sink.into_entries(), resolver.guard().state(&root))
    })
    .await
    .unwrap();

    let mut refs: Vec<String> = entries.iter().map(|e| e.reference.clone()).collect();
    refs.sort();
    assert_eq!(
        refs,
        vec![
            format!("{}/about", base_url),
            format!("{}/contact", base_url),
            format!("{}/posts/hello", base_url),
        ]
    );
    assert_eq!(
        entries.iter().filter(|e| e.last_modified.is_some()).count(),
        2
    );
    assert_eq!(state, RootState::Resolved);
    assert_eq!(file_count(temp_dir.path()), 0);
}

#[tokio::test]
async fn test_missing_and_failing_sitemaps_do_not_stop_resolution() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // /sitemap.xml is not mounted, so the server answers 404
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/extra.xml"))
        .respond_with(xml(urlset(&[(format!("{}/kept", base_url), None)])))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let staging = temp_dir.path().to_path_buf();
    let root = UrlRoot::parse(&base_url).unwrap();
    let explicit = vec![format!("{}/extra.xml", base_url)];

    let (entries, state) = tokio::task::spawn_blocking(move || {
        let resolver = http_resolver(&staging);
        let sink = CollectingSink::new();
        resolver.resolve(&root, &explicit, &sink, false);
        (sink.into_entries(), resolver.guard().state(&root))
    })
    .await
    .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reference, format!("{}/kept", base_url));
    assert_eq!(state, RootState::Resolved);
}

#[tokio::test]
async fn test_concurrent_workers_fetch_sitemap_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(urlset(&[(format!("{}/only", base_url), None)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let staging = temp_dir.path().to_path_buf();
    let root = UrlRoot::parse(&base_url).unwrap();

    let emitted = tokio::task::spawn_blocking(move || {
        let resolver = http_resolver(&staging);
        let sink = CollectingSink::new();
        let workers = 6;
        let barrier = Barrier::new(workers);

        std::thread::scope(|s| {
            for _ in 0..workers {
                s.spawn(|| {
                    barrier.wait();
                    resolver.resolve(&root, &[], &sink, false);
                });
            }
        });

        sink.len()
    })
    .await
    .unwrap();

    assert_eq!(emitted, 1);
}

#[tokio::test]
async fn test_out_of_scope_urls_are_dropped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/blog/sitemap.xml"))
        .respond_with(xml(urlset(&[
            (format!("{}/blog/first-post", base_url), None),
            (format!("{}/shop/item", base_url), None),
            ("https://elsewhere.example/blog/".to_string(), None),
        ])))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let staging = temp_dir.path().to_path_buf();
    let root = UrlRoot::parse(&base_url).unwrap();
    let explicit = vec![format!("{}/blog/sitemap.xml", base_url)];

    let entries = tokio::task::spawn_blocking(move || {
        let resolver = http_resolver(&staging);
        let sink = CollectingSink::new();
        resolver.resolve(&root, &explicit, &sink, true);
        sink.into_entries()
    })
    .await
    .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reference, format!("{}/blog/first-post", base_url));
}
