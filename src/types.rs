//! Content types shared by the dataset loader, converter and exporter.

use crate::blocks::{Block, deserialize_blocks};
use serde::Deserialize;

/// Integer id of a tag in the tag collection.
pub type TagId = i64;

/// An article or project record from the export.
///
/// Both collections share this shape; `published_at` is only read for
/// articles. Missing fields fall back to the defaults the exporter has always
/// used: `"Untitled"`, an empty description, no tags, an empty body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default = "default_title", deserialize_with = "null_as_default_title")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub tags: Vec<TagId>,
    #[serde(default, deserialize_with = "deserialize_blocks")]
    pub main_text: Vec<Block>,
}

fn default_title() -> String {
    "Untitled".to_string()
}

fn null_as_default_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_title))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_vec<'de, D>(deserializer: D) -> Result<Vec<TagId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<TagId>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContentItem {
    /// Item with a title and body, everything else defaulted.
    pub fn new(title: impl Into<String>, main_text: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            published_at: None,
            locale: None,
            tags: Vec::new(),
            main_text,
        }
    }
}

/// A record in the tag collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TagRecord {
    pub tag: String,
}

/// Which collection an item came from.
///
/// The two kinds are converted by the same code; they differ only in the
/// output folder and in whether the front-matter carries a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Article,
    Project,
}

impl ItemKind {
    /// Top-level folder under the output root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ItemKind::Article => "articles",
            ItemKind::Project => "projects",
        }
    }

    /// Singular label for progress output.
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Article => "article",
            ItemKind::Project => "project",
        }
    }

    /// Whether documents of this kind carry a `date:` front-matter line.
    pub fn has_date(self) -> bool {
        matches!(self, ItemKind::Article)
    }
}
