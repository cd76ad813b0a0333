//! Fetch-and-stage step
//!
//! A sitemap body is copied to a local temporary file before any parsing
//! starts, so a slow parse never holds the network connection open long
//! enough to time out.

use crate::sitemap::error::{FetchError, SitemapError};
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Response handed back by a `SitemapFetcher`
pub struct FetchResponse {
    /// HTTP status code
    pub status_code: u16,

    /// Declared Content-Type header, if any
    pub content_type: Option<String>,

    /// Response body, read at most once
    pub body: Box<dyn Read + Send>,
}

impl FetchResponse {
    pub fn new(
        status_code: u16,
        content_type: Option<String>,
        body: impl Read + Send + 'static,
    ) -> Self {
        Self {
            status_code,
            content_type,
            body: Box::new(body),
        }
    }

    /// Returns true if the declared content type is a gzip archive
    ///
    /// Only the media type counts; parameters and case are ignored. The
    /// location's file extension is never consulted.
    pub fn is_gzip(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| {
                let essence = ct.split(';').next().unwrap_or("").trim();
                essence.eq_ignore_ascii_case("application/gzip")
                    || essence.eq_ignore_ascii_case("application/x-gzip")
            })
            .unwrap_or(false)
    }
}

impl fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status_code", &self.status_code)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Transport used to retrieve sitemap locations
///
/// Retries, redirects and timeouts are the implementation's business.
pub trait SitemapFetcher: Send + Sync {
    fn fetch(&self, location: &str) -> Result<FetchResponse, FetchError>;
}

/// A sitemap body saved to disk
///
/// The file is deleted when this value is dropped, whatever path the
/// caller leaves by.
#[derive(Debug)]
pub struct StagedSitemap {
    file: NamedTempFile,
}

impl StagedSitemap {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Opens an independent buffered reader over the staged content
    pub fn reader(&self) -> io::Result<BufReader<File>> {
        Ok(BufReader::new(self.file.reopen()?))
    }
}

/// Outcome of staging one location
#[derive(Debug)]
pub enum Staged {
    File(StagedSitemap),
    /// HTTP 404: the location simply has no sitemap
    NotFound,
}

/// Fetches locations and stages their bodies in a temporary directory
pub struct Stager {
    fetcher: Arc<dyn SitemapFetcher>,
    temp_dir: PathBuf,
}

impl Stager {
    pub fn new(fetcher: Arc<dyn SitemapFetcher>, temp_dir: PathBuf) -> Self {
        Self { fetcher, temp_dir }
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Fetches `location` and stages its (decompressed) body
    ///
    /// | Response | Result |
    /// |----------|--------|
    /// | 200 | `Staged::File` |
    /// | 404 | `Staged::NotFound` |
    /// | other status | `SitemapError::UnexpectedStatus` |
    /// | fetcher error | `SitemapError::Fetch` |
    pub fn stage(&self, location: &str) -> Result<Staged, SitemapError> {
        let response = self
            .fetcher
            .fetch(location)
            .map_err(|source| SitemapError::Fetch {
                location: location.to_string(),
                source,
            })?;

        match response.status_code {
            200 => {}
            404 => return Ok(Staged::NotFound),
            status => {
                return Err(SitemapError::UnexpectedStatus {
                    location: location.to_string(),
                    status,
                })
            }
        }

        let gzip = response.is_gzip();
        let mut body: Box<dyn Read + Send> = if gzip {
            Box::new(MultiGzDecoder::new(response.body))
        } else {
            response.body
        };

        let mut file = self.create_temp_file(location)?;
        tracing::debug!("Temporarily saving sitemap at: {}", file.path().display());

        io::copy(&mut body, &mut file)
            .and_then(|_| file.flush())
            .map_err(|source| SitemapError::Body {
                location: location.to_string(),
                source,
            })?;

        Ok(Staged::File(StagedSitemap { file }))
    }

    fn create_temp_file(&self, location: &str) -> Result<NamedTempFile, SitemapError> {
        let staging_error = |source| SitemapError::Staging {
            location: location.to_string(),
            dir: self.temp_dir.clone(),
            source,
        };

        std::fs::create_dir_all(&self.temp_dir).map_err(staging_error)?;

        tempfile::Builder::new()
            .prefix("sitemap-")
            .suffix(".xml")
            .tempfile_in(&self.temp_dir)
            .map_err(staging_error)
    }
}
