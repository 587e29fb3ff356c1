//! Shared test utilities for the strapi-md test suite.
//!
//! Provides a recording [`MockFetcher`] that never touches the network, and
//! terse builders for the block shapes tests keep reaching for.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let fetcher = MockFetcher::failing_on(&["https://cdn/broken.png"]);
//! let out = render_blocks(&[heading(2, "Intro"), paragraph("hi")], dir, &fetcher);
//! assert_eq!(fetcher.get_requests().len(), 0);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::blocks::{Block, ImagePayload, Inline, ListFormat, ListItem};
use crate::fetch::{FetchError, ImageFetcher, extension_from_url};

// =========================================================================
// Fake fetcher
// =========================================================================

/// One call made to [`MockFetcher::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: String,
    pub dir: PathBuf,
    pub base_name: String,
}

/// Fetcher that records requests and returns the path a real download would
/// produce, without touching the network.
///
/// By default nothing is written to disk; [`MockFetcher::writing`] writes a
/// small placeholder file so filesystem-level tests can see the image.
#[derive(Default)]
pub struct MockFetcher {
    pub requests: Mutex<Vec<FetchRequest>>,
    failing: Vec<String>,
    write_files: bool,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every request whose URL is in `urls`.
    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            failing: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Write placeholder bytes at the returned path.
    pub fn writing() -> Self {
        Self {
            write_files: true,
            ..Self::default()
        }
    }

    pub fn get_requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageFetcher for MockFetcher {
    fn fetch(&self, url: &str, dir: &Path, base_name: &str) -> Result<PathBuf, FetchError> {
        self.requests.lock().unwrap().push(FetchRequest {
            url: url.to_string(),
            dir: dir.to_path_buf(),
            base_name: base_name.to_string(),
        });

        if self.failing.iter().any(|u| u == url) {
            return Err(FetchError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock refused",
            )));
        }

        let path = dir.join(format!("{base_name}{}", extension_from_url(url, ".jpg")));
        if self.write_files {
            fs::create_dir_all(dir)?;
            fs::write(&path, url.as_bytes())?;
        }
        Ok(path)
    }
}

// =========================================================================
// Block builders
// =========================================================================

pub fn heading(level: u8, text: &str) -> Block {
    Block::Heading {
        level: Some(level),
        children: vec![Inline::text(text)],
    }
}

pub fn paragraph(text: &str) -> Block {
    Block::Paragraph {
        children: vec![Inline::text(text)],
    }
}

pub fn bold_italic(text: &str) -> Inline {
    Inline {
        bold: true,
        italic: true,
        ..Inline::text(text)
    }
}

pub fn image(url: Option<&str>, alt: Option<&str>, caption: Option<&str>) -> Block {
    Block::Image {
        image: Some(ImagePayload {
            url: url.map(String::from),
            alternative_text: alt.map(String::from),
            caption: caption.map(String::from),
        }),
    }
}

pub fn list_item(text: &str) -> ListItem {
    ListItem {
        children: vec![Inline::text(text)],
    }
}

pub fn list(ordered: bool, items: &[&str]) -> Block {
    Block::List {
        format: Some(if ordered {
            ListFormat::Ordered
        } else {
            ListFormat::Unordered
        }),
        children: items.iter().map(|t| list_item(t)).collect(),
    }
}
