//! Image download capability.
//!
//! The renderer never talks to the network directly: it asks an
//! [`ImageFetcher`] to materialize a URL as `<dir>/<base_name><ext>`. The
//! production implementation is [`HttpFetcher`], a blocking HTTP client. Tests
//! use an in-memory fake (see `test_helpers::MockFetcher`).
//!
//! A failed download is an ordinary `Err` value. The renderer reports it and
//! leaves the image out; it never aborts the document.

use crate::config::ImagesConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can put a remote image on disk.
pub trait ImageFetcher {
    /// Download `url` into `dir` as `<base_name><ext>`, creating `dir` if
    /// needed. Returns the written path.
    fn fetch(&self, url: &str, dir: &Path, base_name: &str) -> Result<PathBuf, FetchError>;
}

/// File extension (with the dot) taken from the last segment of the URL path.
///
/// The query string and fragment are ignored. Returns `default` when the path
/// has no extension or the URL cannot be parsed.
///
/// - `https://cdn.example.com/uploads/photo.png?w=800` → `.png`
/// - `https://cdn.example.com/uploads/photo` → `default`
/// - `/uploads/archive.tar.gz` → `.gz`
pub fn extension_from_url(url: &str, default: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Strapi local uploads are site-relative (`/uploads/x.png`)
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{ext}"),
        _ => default.to_string(),
    }
}

/// Downloads images over HTTP(S) with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    default_extension: String,
}

impl HttpFetcher {
    pub fn new(config: &ImagesConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            default_extension: config.default_extension.clone(),
        })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dir: &Path, base_name: &str) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(dir)?;
        let extension = extension_from_url(url, &self.default_extension);
        let local_path = dir.join(format!("{base_name}{extension}"));

        let parsed = Url::parse(url)?;
        let bytes = self
            .client
            .get(parsed)
            .send()?
            .error_for_status()?
            .bytes()?;
        fs::write(&local_path, &bytes)?;
        Ok(local_path)
    }
}
