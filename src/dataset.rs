//! Loading the Strapi export.
//!
//! The export is a single JSON document. Each collection is an object keyed
//! by record id:
//!
//! ```text
//! {
//!   "data": {
//!     "api::article.article": { "1": { "title": "…", "tags": [3], "mainText": [ … ] } },
//!     "api::project.project": { "4": { … } },
//!     "api::tag.tag":         { "3": { "tag": "rust" } }
//!   }
//! }
//! ```
//!
//! Records keep the order they have in the file, so repeated runs over the
//! same export visit items in the same order. A missing or `null` collection
//! is treated as empty.

use crate::config::CollectionsConfig;
use crate::types::{ContentItem, TagId, TagRecord};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("collection '{0}' is not an object keyed by id")]
    NotACollection(String),
    #[error("invalid record '{id}' in '{collection}': {source}")]
    InvalidRecord {
        collection: String,
        id: String,
        source: serde_json::Error,
    },
    #[error("tag id '{0}' is not an integer")]
    InvalidTagId(String),
}

/// A loaded export: both item collections plus the tag lookup.
#[derive(Debug, Default)]
pub struct Dataset {
    /// `(record id, item)` in file order.
    pub articles: Vec<(String, ContentItem)>,
    /// `(record id, item)` in file order.
    pub projects: Vec<(String, ContentItem)>,
    pub tags: TagLookup,
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

/// Read and parse the export at `path`.
pub fn load_dataset(path: &Path, collections: &CollectionsConfig) -> Result<Dataset, DatasetError> {
    let content = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&content, collections)
}

/// Parse an export from a JSON string.
pub fn parse_dataset(json: &str, collections: &CollectionsConfig) -> Result<Dataset, DatasetError> {
    let raw: RawExport = serde_json::from_str(json)?;
    let data = raw.data.unwrap_or_default();

    let tag_records: Vec<(String, TagRecord)> = records(&data, &collections.tags)?;
    Ok(Dataset {
        articles: records(&data, &collections.articles)?,
        projects: records(&data, &collections.projects)?,
        tags: TagLookup::from_records(tag_records)?,
    })
}

/// Deserialize every record of one collection, in file order.
fn records<T>(data: &Map<String, Value>, key: &str) -> Result<Vec<(String, T)>, DatasetError>
where
    T: for<'de> Deserialize<'de>,
{
    let entries = match data.get(key) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(DatasetError::NotACollection(key.to_string())),
    };
    entries
        .iter()
        .map(|(id, value)| {
            let record = T::deserialize(value).map_err(|source| DatasetError::InvalidRecord {
                collection: key.to_string(),
                id: id.clone(),
                source,
            })?;
            Ok((id.clone(), record))
        })
        .collect()
}

/// Tag id → tag name, built once per run.
#[derive(Debug, Clone, Default)]
pub struct TagLookup {
    names: HashMap<TagId, String>,
}

impl TagLookup {
    /// Build the lookup from `(id, record)` pairs; ids must be integers.
    pub fn from_records(
        records: impl IntoIterator<Item = (String, TagRecord)>,
    ) -> Result<Self, DatasetError> {
        let mut names = HashMap::new();
        for (id, record) in records {
            let id: TagId = id
                .trim()
                .parse()
                .map_err(|_| DatasetError::InvalidTagId(id.clone()))?;
            names.insert(id, record.tag);
        }
        Ok(Self { names })
    }

    pub fn get(&self, id: TagId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Resolve ids to names, in order. Unknown ids resolve to their decimal
    /// form so no tag silently disappears.
    pub fn resolve(&self, ids: &[TagId]) -> Vec<String> {
        ids.iter()
            .map(|id| self.get(*id).map_or_else(|| id.to_string(), str::to_string))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(TagId, String)> for TagLookup {
    fn from_iter<I: IntoIterator<Item = (TagId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
