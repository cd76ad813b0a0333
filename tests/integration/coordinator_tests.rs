//! End-to-end runs through the coordinator and SQLite storage

use crate::common::{create_test_config, seed, sitemap_index, urlset};
use sitemap_resolver::config::Config;
use sitemap_resolver::crawler::{Coordinator, RunSummary};
use sitemap_resolver::storage::SqliteStorage;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "application/xml")
}

async fn run(config: Config, fresh: bool) -> RunSummary {
    tokio::task::spawn_blocking(move || {
        let coordinator = Coordinator::new(config, fresh).unwrap();
        coordinator.run().unwrap()
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_full_run_with_robots_and_index() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nAllow: /\nSitemap: {}/declared.xml\n",
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/declared.xml"))
        .respond_with(xml(urlset(&[(format!("{}/from-robots", base_url), None)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(sitemap_index(&[
            format!("{}/part-1.xml", base_url),
            // Already reachable from robots.txt
            format!("{}/declared.xml", base_url),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/part-1.xml"))
        .respond_with(xml(urlset(&[
            (format!("{}/a", base_url), Some("2023-06-01")),
            (format!("{}/b", base_url), None),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let staging = temp_dir.path().join("staging");
    let db_path = temp_dir.path().join("sitemaps.db");

    // Three seeds on one root race for it
    let config = create_test_config(
        vec![
            seed(&format!("{}/", base_url), &[]),
            seed(&format!("{}/a", base_url), &[]),
            seed(&format!("{}/b", base_url), &[]),
        ],
        &staging,
        &db_path,
    );

    let summary = run(config.clone(), false).await;

    assert_eq!(summary.seeds, 3);
    assert_eq!(summary.roots, 1);
    assert_eq!(summary.urls_emitted, 3);
    assert!(!summary.interrupted);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_resolved_roots().unwrap(), 1);
    assert_eq!(storage.count_sitemap_urls().unwrap(), 3);
    assert_eq!(storage.count_sitemap_urls_with_lastmod().unwrap(), 1);
    drop(storage);

    // A second run finds the root resolved and fetches nothing
    let summary = run(config, false).await;
    assert_eq!(summary.urls_emitted, 0);
}

#[tokio::test]
async fn test_start_url_sitemaps_are_exclusive() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Sitemap: /sitemap.xml"))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(urlset(&[(format!("{}/default", base_url), None)])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/sitemap.xml"))
        .respond_with(xml(urlset(&[(format!("{}/docs/intro", base_url), None)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("sitemaps.db");
    let config = create_test_config(
        vec![seed(
            &format!("{}/docs/", base_url),
            &[format!("{}/docs/sitemap.xml", base_url)],
        )],
        temp_dir.path(),
        &db_path,
    );

    let summary = run(config, false).await;

    assert_eq!(summary.urls_emitted, 1);
    let storage = SqliteStorage::new(&db_path).unwrap();
    let record = storage
        .get_sitemap_url(&format!("{}/docs/intro", base_url))
        .unwrap()
        .unwrap();
    assert_eq!(record.root, base_url);
}

#[tokio::test]
async fn test_fresh_run_resolves_again() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(urlset(&[(format!("{}/page", base_url), None)])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("sitemaps.db");
    let mut config = create_test_config(
        vec![seed(&format!("{}/", base_url), &[])],
        temp_dir.path(),
        &db_path,
    );
    config.crawler.robots = false;

    let first = run(config.clone(), false).await;
    let skipped = run(config.clone(), false).await;
    let fresh = run(config, true).await;

    assert_eq!(first.urls_emitted, 1);
    assert_eq!(skipped.urls_emitted, 0);
    assert_eq!(fresh.urls_emitted, 1);

    // Re-resolving upserts rather than duplicating
    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_sitemap_urls().unwrap(), 1);
    assert!(Path::new(&db_path).exists());
}
