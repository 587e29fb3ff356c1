//! Item → Markdown document.
//!
//! Articles and projects go through the same converter. Each becomes one
//! `index.md` at a path fully determined by kind, locale and title:
//!
//! ```text
//! <output>/articles/<locale>/<slug>/index.md
//! <output>/articles/<locale>/<slug>/images/image-1.png
//! <output>/projects/<locale>/<slug>/index.md
//! ```
//!
//! The document is front-matter followed by the rendered body:
//!
//! ```text
//! ---
//! title: "My Post"
//! description: "About things"
//! date: 2024-03-05
//! locale: en
//! tags: ["go", "rust"]
//! ---
//!
//! Body…
//! ```
//!
//! `date` appears for articles only. It is the `publishedAt` day, `Draft`
//! when the article was never published, or `Unknown Date` when the
//! timestamp cannot be parsed. `tags` appears only when there are tags.
//!
//! An existing document at the same path is overwritten: two items with the
//! same slug in the same kind and locale end up as a single file.

use crate::fetch::ImageFetcher;
use crate::naming::sanitize_filename;
use crate::render::{RenderOutput, SkippedImage, render_blocks};
use crate::types::{ContentItem, ItemKind};
use chrono::NaiveDateTime;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DOCUMENT_NAME: &str = "index.md";
pub const IMAGES_DIR: &str = "images";

/// `publishedAt` format; fractional seconds are optional.
const PUBLISHED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Outcome of converting one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedItem {
    /// The written `index.md`.
    pub path: PathBuf,
    pub images_written: usize,
    pub skipped_images: Vec<SkippedImage>,
}

/// Front-matter `date:` value for an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentDate {
    Published(chrono::NaiveDate),
    /// No `publishedAt` at all.
    Draft,
    /// `publishedAt` present but not in the expected format.
    Unknown,
}

impl DocumentDate {
    pub fn from_published_at(published_at: Option<&str>) -> Self {
        match published_at {
            None | Some("") => DocumentDate::Draft,
            Some(raw) => NaiveDateTime::parse_from_str(raw, PUBLISHED_AT_FORMAT)
                .map(|dt| DocumentDate::Published(dt.date()))
                .unwrap_or(DocumentDate::Unknown),
        }
    }
}

impl fmt::Display for DocumentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentDate::Published(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DocumentDate::Draft => f.write_str("Draft"),
            DocumentDate::Unknown => f.write_str("Unknown Date"),
        }
    }
}

/// Document metadata, rendered in a fixed field order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontMatter<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub date: Option<DocumentDate>,
    pub locale: &'a str,
    pub tags: &'a [String],
}

impl<'a> FrontMatter<'a> {
    pub fn for_item(item: &'a ContentItem, kind: ItemKind, locale: &'a str, tags: &'a [String]) -> Self {
        Self {
            title: &item.title,
            description: &item.description,
            date: kind
                .has_date()
                .then(|| DocumentDate::from_published_at(item.published_at.as_deref())),
            locale,
            tags,
        }
    }

    /// `---`-fenced block followed by a blank line.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        out.push_str(&format!("title: \"{}\"\n", quote_escape(self.title)));
        out.push_str(&format!("description: \"{}\"\n", quote_escape(self.description)));
        if let Some(date) = &self.date {
            out.push_str(&format!("date: {date}\n"));
        }
        out.push_str(&format!("locale: {}\n", self.locale));
        if !self.tags.is_empty() {
            let tags: Vec<String> = self
                .tags
                .iter()
                .map(|t| format!("\"{}\"", quote_escape(t)))
                .collect();
            out.push_str(&format!("tags: [{}]\n", tags.join(", ")));
        }
        out.push_str("---\n\n");
        out
    }
}

/// Escape `\`, `"` and line breaks so the value stays a single-line
/// double-quoted YAML scalar.
fn quote_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Folder that holds the item's `index.md` and `images/`.
pub fn document_dir(output_root: &Path, kind: ItemKind, locale: &str, title: &str) -> PathBuf {
    output_root
        .join(kind.dir_name())
        .join(locale)
        .join(sanitize_filename(title))
}

/// Path of the item's `index.md`.
pub fn document_path(output_root: &Path, kind: ItemKind, locale: &str, title: &str) -> PathBuf {
    document_dir(output_root, kind, locale, title).join(DOCUMENT_NAME)
}

/// Convert one item and write its document.
///
/// `tags` are the item's tag names, already resolved from ids by the caller.
/// Image failures are recorded in the result; only a failure to create the
/// document folder or write the file is an error.
pub fn convert_item(
    item: &ContentItem,
    kind: ItemKind,
    tags: &[String],
    output_root: &Path,
    locale: &str,
    fetcher: &impl ImageFetcher,
) -> Result<ConvertedItem, ConvertError> {
    let dir = document_dir(output_root, kind, locale, &item.title);
    fs::create_dir_all(&dir).map_err(|source| ConvertError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let mut document = FrontMatter::for_item(item, kind, locale, tags).render();
    let RenderOutput {
        markdown,
        images_written,
        skipped_images,
    } = render_blocks(&item.main_text, &dir.join(IMAGES_DIR), fetcher);
    document.push_str(&markdown);

    let path = dir.join(DOCUMENT_NAME);
    fs::write(&path, document).map_err(|source| ConvertError::Write {
        path: path.clone(),
        source,
    })?;

    Ok(ConvertedItem {
        path,
        images_written,
        skipped_images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn article(title: &str) -> ContentItem {
        ContentItem::new(title, vec![paragraph("hi")])
    }

    // =========================================================================
    // Dates
    // =========================================================================

    #[test]
    fn date_from_published_at() {
        assert_eq!(
            DocumentDate::from_published_at(Some("2024-03-05T12:34:56.789Z")),
            DocumentDate::Published(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
    }

    #[test]
    fn date_without_fraction_is_accepted() {
        assert_eq!(
            DocumentDate::from_published_at(Some("2024-03-05T12:34:56Z")).to_string(),
            "2024-03-05"
        );
    }

    #[test]
    fn missing_date_is_draft() {
        assert_eq!(DocumentDate::from_published_at(None).to_string(), "Draft");
        assert_eq!(DocumentDate::from_published_at(Some("")).to_string(), "Draft");
    }

    #[test]
    fn malformed_date_is_unknown() {
        for raw in ["yesterday", "2024-03-05", "2024-03-05T12:34:56+02:00", "2024-13-40T00:00:00.000Z"] {
            assert_eq!(
                DocumentDate::from_published_at(Some(raw)),
                DocumentDate::Unknown,
                "input: {raw}"
            );
        }
        assert_eq!(DocumentDate::Unknown.to_string(), "Unknown Date");
    }

    // =========================================================================
    // Front-matter
    // =========================================================================

    #[test]
    fn article_front_matter_field_order() {
        let mut item = article("My Post");
        item.description = "About things".into();
        item.published_at = Some("2024-03-05T10:00:00.000Z".into());
        let tags = vec!["go".to_string(), "rust".to_string()];
        let fm = FrontMatter::for_item(&item, ItemKind::Article, "en", &tags).render();
        assert_eq!(
            fm,
            "---\n\
             title: \"My Post\"\n\
             description: \"About things\"\n\
             date: 2024-03-05\n\
             locale: en\n\
             tags: [\"go\", \"rust\"]\n\
             ---\n\n"
        );
    }

    #[test]
    fn project_front_matter_has_no_date() {
        let mut item = article("Tool");
        item.published_at = Some("2024-03-05T10:00:00.000Z".into());
        let fm = FrontMatter::for_item(&item, ItemKind::Project, "de", &[]).render();
        assert_eq!(fm, "---\ntitle: \"Tool\"\ndescription: \"\"\nlocale: de\n---\n\n");
    }

    #[test]
    fn no_tags_line_when_empty() {
        let item = article("X");
        let fm = FrontMatter::for_item(&item, ItemKind::Article, "en", &[]).render();
        assert!(!fm.contains("tags:"));
        assert!(fm.contains("date: Draft\n"));
    }

    #[test]
    fn quotes_in_values_are_escaped() {
        let mut item = article(r#"Say "hi""#);
        item.description = r"C:\path".into();
        let tags = vec![r#"a"b"#.to_string()];
        let fm = FrontMatter::for_item(&item, ItemKind::Project, "en", &tags).render();
        assert!(fm.contains(r#"title: "Say \"hi\"""#));
        assert!(fm.contains(r#"description: "C:\\path""#));
        assert!(fm.contains(r#"tags: ["a\"b"]"#));
    }

    #[test]
    fn line_breaks_stay_inside_the_quoted_value() {
        let mut item = article("Two\r\nLines");
        item.description = "line one\n---\nline two".into();
        let fm = FrontMatter::for_item(&item, ItemKind::Article, "en", &[]).render();
        assert!(fm.contains(r#"title: "Two\r\nLines""#));
        assert!(fm.contains(r#"description: "line one\n---\nline two""#));
        let fences = fm.lines().filter(|l| *l == "---").count();
        assert_eq!(fences, 2, "front-matter must not be closed early:\n{fm}");
        assert_eq!(fm.lines().count(), 7);
    }

    // =========================================================================
    // Paths
    // =========================================================================

    #[test]
    fn document_path_layout() {
        let path = document_path(Path::new("out"), ItemKind::Project, "fr", "Hello World!");
        assert_eq!(path, Path::new("out/projects/fr/hello-world/index.md"));
    }

    // =========================================================================
    // convert_item
    // =========================================================================

    #[test]
    fn converts_draft_article() {
        let tmp = TempDir::new().unwrap();
        let item = article("My Post");
        let result = convert_item(
            &item,
            ItemKind::Article,
            &[],
            tmp.path(),
            "en",
            &MockFetcher::new(),
        )
        .unwrap();

        assert_eq!(result.path, tmp.path().join("articles/en/my-post/index.md"));
        let content = fs::read_to_string(&result.path).unwrap();
        assert!(content.contains("date: Draft\n"));
        assert!(!content.contains("tags:"));
        assert!(content.ends_with("---\n\nhi\n\n"));
    }

    #[test]
    fn images_go_next_to_document() {
        let tmp = TempDir::new().unwrap();
        let item = ContentItem::new(
            "Gallery",
            vec![
                image(Some("https://cdn/a.png"), Some("A"), None),
                image(Some("https://cdn/b"), None, None),
            ],
        );
        let fetcher = MockFetcher::writing();
        let result =
            convert_item(&item, ItemKind::Project, &[], tmp.path(), "en", &fetcher).unwrap();

        let doc_dir = tmp.path().join("projects/en/gallery");
        assert_eq!(result.images_written, 2);
        assert!(doc_dir.join("images/image-1.png").is_file());
        assert!(doc_dir.join("images/image-2.jpg").is_file());
        let content = fs::read_to_string(&result.path).unwrap();
        assert!(content.contains("![A](images/image-1.png)\n\n![Image 2](images/image-2.jpg)\n\n"));
        assert!(fetcher.get_requests().iter().all(|r| r.dir == doc_dir.join("images")));
    }

    #[test]
    fn skipped_images_are_returned() {
        let tmp = TempDir::new().unwrap();
        let item = ContentItem::new("Broken", vec![image(Some("https://cdn/x.png"), None, None)]);
        let fetcher = MockFetcher::failing_on(&["https://cdn/x.png"]);
        let result =
            convert_item(&item, ItemKind::Article, &[], tmp.path(), "en", &fetcher).unwrap();
        assert_eq!(result.images_written, 0);
        assert_eq!(result.skipped_images.len(), 1);
        let content = fs::read_to_string(&result.path).unwrap();
        assert!(!content.contains("!["));
    }

    #[test]
    fn existing_document_is_overwritten() {
        let tmp = TempDir::new().unwrap();
        let first = ContentItem::new("Same", vec![paragraph("first")]);
        let second = ContentItem::new("Same!", vec![paragraph("second")]);
        let fetcher = MockFetcher::new();
        let a = convert_item(&first, ItemKind::Article, &[], tmp.path(), "en", &fetcher).unwrap();
        let b = convert_item(&second, ItemKind::Article, &[], tmp.path(), "en", &fetcher).unwrap();
        assert_eq!(a.path, b.path);
        let content = fs::read_to_string(&b.path).unwrap();
        assert!(content.contains("second"));
        assert!(!content.contains("first"));
    }

    #[test]
    fn write_failure_is_an_error() {
        let tmp = TempDir::new().unwrap();
        // A file where the kind folder should be blocks directory creation
        fs::write(tmp.path().join("articles"), "not a dir").unwrap();
        let err = convert_item(
            &article("X"),
            ItemKind::Article,
            &[],
            tmp.path(),
            "en",
            &MockFetcher::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::CreateDir { .. }));
    }
}
