use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_resolver::config::{
    Config, CrawlerConfig, OutputConfig, SeedEntry, SitemapConfig, UserAgentConfig,
};
use std::io::Write;
use std::path::Path;

pub fn user_agent_config() -> UserAgentConfig {
    UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        contact_email: "test@example.com".to_string(),
    }
}

pub fn sitemap_config(temp_dir: &Path) -> SitemapConfig {
    SitemapConfig {
        temp_dir: Some(temp_dir.to_path_buf()),
        ..SitemapConfig::default()
    }
}

/// Creates a test configuration storing into `db_path`
pub fn create_test_config(seeds: Vec<SeedEntry>, temp_dir: &Path, db_path: &Path) -> Config {
    Config {
        sitemap: sitemap_config(temp_dir),
        user_agent: user_agent_config(),
        crawler: CrawlerConfig {
            workers: 4,
            robots: true,
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        seeds,
    }
}

pub fn seed(url: &str, sitemaps: &[String]) -> SeedEntry {
    SeedEntry {
        url: url.to_string(),
        sitemaps: sitemaps.to_vec(),
    }
}

/// Builds a `<urlset>` document; each entry is `(loc, lastmod)`
pub fn urlset(entries: &[(String, Option<&str>)]) -> String {
    let body: String = entries
        .iter()
        .map(|(loc, lastmod)| match lastmod {
            Some(date) => format!("<url><loc>{}</loc><lastmod>{}</lastmod></url>", loc, date),
            None => format!("<url><loc>{}</loc></url>", loc),
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        body
    )
}

/// Builds a `<sitemapindex>` document
pub fn sitemap_index(children: &[String]) -> String {
    let body: String = children
        .iter()
        .map(|c| format!("<sitemap><loc>{}</loc></sitemap>", c))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        body
    )
}

pub fn gzip(data: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}
