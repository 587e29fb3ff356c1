//! Rich-text block model.
//!
//! Strapi stores an item's body (`mainText`) as a JSON array of typed blocks:
//!
//! ```json
//! [
//!   { "type": "heading", "level": 2, "children": [{ "type": "text", "text": "Intro" }] },
//!   { "type": "paragraph", "children": [
//!       { "type": "text", "text": "Read ", "bold": true },
//!       { "type": "link", "url": "https://example.com", "children": [{ "type": "text", "text": "this" }] }
//!   ] },
//!   { "type": "image", "image": { "url": "https://cdn.example.com/a.png", "alternativeText": "A" } },
//!   { "type": "code", "language": "rust", "code": "fn main() {}" },
//!   { "type": "quote", "children": [{ "type": "text", "text": "Quoted" }] },
//!   { "type": "list", "format": "ordered", "children": [
//!       { "type": "list-item", "children": [{ "type": "text", "text": "first" }] }
//!   ] }
//! ]
//! ```
//!
//! [`Block`] is a closed enum over the supported types. A block of any other
//! type, or one whose fields do not have the expected shape, becomes
//! [`Block::Unsupported`] instead of failing the whole dataset: one odd block
//! must not prevent the rest of the export.

use serde::{Deserialize, Deserializer};

/// One top-level body block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Heading {
        /// A level outside `0..=255` makes the whole block unsupported.
        #[serde(default)]
        level: Option<u8>,
        #[serde(default, deserialize_with = "null_as_default")]
        children: Vec<Inline>,
    },
    Paragraph {
        #[serde(default, deserialize_with = "null_as_default")]
        children: Vec<Inline>,
    },
    Image {
        #[serde(default)]
        image: Option<ImagePayload>,
    },
    Code {
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        language: Option<String>,
        /// Strapi's native code block carries its text as inline children
        /// rather than a `code` string.
        #[serde(default, deserialize_with = "null_as_default")]
        children: Vec<Inline>,
    },
    Quote {
        #[serde(default, deserialize_with = "null_as_default")]
        children: Vec<Inline>,
    },
    List {
        #[serde(default)]
        format: Option<ListFormat>,
        #[serde(default, deserialize_with = "null_as_default")]
        children: Vec<ListItem>,
    },
    #[serde(other)]
    Unsupported,
}

/// Uploaded media referenced by an image block.
///
/// Strapi sends many more fields (formats, dimensions, hash, …); only the
/// ones the renderer uses are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImagePayload {
    pub url: Option<String>,
    pub alternative_text: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    #[serde(other)]
    Unordered,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListItem {
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<Inline>,
}

/// Inline node inside a paragraph, heading, quote or list item.
///
/// Every field reads `null` as its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Inline {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: InlineKind,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bold: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub italic: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub underline: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub code: bool,
    /// Link target; only meaningful when `kind` is [`InlineKind::Link`].
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    /// Link text runs; only meaningful when `kind` is [`InlineKind::Link`].
    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<Inline>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InlineKind {
    #[default]
    Text,
    Link,
    #[serde(other)]
    Other,
}

impl Inline {
    /// Plain text run with no formatting.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Link whose visible text is the given runs.
    pub fn link(url: impl Into<String>, children: Vec<Inline>) -> Self {
        Self {
            kind: InlineKind::Link,
            url: url.into(),
            children,
            ..Self::default()
        }
    }
}

/// Concatenate the raw `text` of each node, ignoring formatting flags.
pub fn plain_text(children: &[Inline]) -> String {
    children.iter().map(|c| c.text.as_str()).collect()
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a block array, mapping malformed entries to
/// [`Block::Unsupported`] rather than rejecting the document.
pub fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<Block>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or(Block::Unsupported))
        .collect())
}
