//! Whole-export orchestration.
//!
//! Loads the dataset, then converts every article followed by every project,
//! in file order, one at a time. Tag ids are translated to names here, before
//! an item reaches the converter.
//!
//! Progress is reported as [`ExportEvent`]s over an optional channel so the
//! CLI can print while the export runs; the library itself never prints.
//!
//! ## Failure policy
//!
//! | Failure | Effect |
//! |---|---|
//! | image download | [`ExportEvent::ImageSkipped`], document still written |
//! | document write | [`ItemErrorPolicy::Abort`]: run stops with [`ExportError::Item`]; [`ItemErrorPolicy::Skip`]: [`ExportEvent::ItemFailed`], next item |
//! | dataset/config | run stops before anything is written |

use crate::config::{ExportConfig, ItemErrorPolicy};
use crate::convert::{ConvertError, convert_item, document_path};
use crate::dataset::{Dataset, DatasetError, load_dataset};
use crate::fetch::{FetchError, HttpFetcher, ImageFetcher};
use crate::types::{ContentItem, ItemKind};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("cannot set up image downloads: {0}")]
    Fetcher(#[from] FetchError),
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{kind} '{title}': {source}")]
    Item {
        kind: &'static str,
        title: String,
        source: ConvertError,
    },
}

/// Progress reported while exporting.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    CollectionStarted {
        kind: ItemKind,
        count: usize,
    },
    ItemWritten {
        kind: ItemKind,
        title: String,
        path: PathBuf,
        images: usize,
    },
    ImageSkipped {
        title: String,
        url: String,
        reason: String,
    },
    ItemFailed {
        kind: ItemKind,
        title: String,
        error: String,
    },
}

/// Counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub articles: usize,
    pub projects: usize,
    pub images: usize,
    pub skipped_images: usize,
    pub failed_items: usize,
}

/// Load the configured export and write the Markdown tree, downloading
/// images over HTTP.
pub fn export(
    config: &ExportConfig,
    events: Option<Sender<ExportEvent>>,
) -> Result<ExportSummary, ExportError> {
    let dataset = load_dataset(&config.input, &config.collections)?;
    let fetcher = HttpFetcher::new(&config.images)?;
    export_with_fetcher(&dataset, config, &fetcher, events.as_ref())
}

/// Write the Markdown tree for an already loaded dataset using `fetcher` for
/// images (allows testing without network access).
pub fn export_with_fetcher(
    dataset: &Dataset,
    config: &ExportConfig,
    fetcher: &impl ImageFetcher,
    events: Option<&Sender<ExportEvent>>,
) -> Result<ExportSummary, ExportError> {
    fs::create_dir_all(&config.output).map_err(|source| ExportError::OutputDir {
        path: config.output.clone(),
        source,
    })?;

    let mut summary = ExportSummary::default();
    for (kind, items) in collections(dataset) {
        emit(
            events,
            ExportEvent::CollectionStarted {
                kind,
                count: items.len(),
            },
        );
        for (_, item) in items {
            let written = export_item(dataset, config, fetcher, events, kind, item, &mut summary)?;
            if written {
                match kind {
                    ItemKind::Article => summary.articles += 1,
                    ItemKind::Project => summary.projects += 1,
                }
            }
        }
    }
    Ok(summary)
}

/// Convert one item, applying the failure policy. Returns whether the
/// document was written.
fn export_item(
    dataset: &Dataset,
    config: &ExportConfig,
    fetcher: &impl ImageFetcher,
    events: Option<&Sender<ExportEvent>>,
    kind: ItemKind,
    item: &ContentItem,
    summary: &mut ExportSummary,
) -> Result<bool, ExportError> {
    let tags = dataset.tags.resolve(&item.tags);
    let locale = item_locale(item, config);

    match convert_item(item, kind, &tags, &config.output, locale, fetcher) {
        Ok(converted) => {
            summary.images += converted.images_written;
            summary.skipped_images += converted.skipped_images.len();
            for skipped in converted.skipped_images {
                emit(
                    events,
                    ExportEvent::ImageSkipped {
                        title: item.title.clone(),
                        url: skipped.url,
                        reason: skipped.reason,
                    },
                );
            }
            emit(
                events,
                ExportEvent::ItemWritten {
                    kind,
                    title: item.title.clone(),
                    path: converted.path,
                    images: converted.images_written,
                },
            );
            Ok(true)
        }
        Err(source) => match config.on_item_error {
            ItemErrorPolicy::Abort => Err(ExportError::Item {
                kind: kind.label(),
                title: item.title.clone(),
                source,
            }),
            ItemErrorPolicy::Skip => {
                summary.failed_items += 1;
                emit(
                    events,
                    ExportEvent::ItemFailed {
                        kind,
                        title: item.title.clone(),
                        error: source.to_string(),
                    },
                );
                Ok(false)
            }
        },
    }
}

fn emit(events: Option<&Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is listening anymore
        tx.send(event).ok();
    }
}

/// Articles first, then projects.
fn collections(dataset: &Dataset) -> [(ItemKind, &[(String, ContentItem)]); 2] {
    [
        (ItemKind::Article, dataset.articles.as_slice()),
        (ItemKind::Project, dataset.projects.as_slice()),
    ]
}

/// The item's locale, or the configured default when it has none.
pub fn item_locale<'a>(item: &'a ContentItem, config: &'a ExportConfig) -> &'a str {
    item.locale
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or(&config.default_locale)
}

// =============================================================================
// Planning (used by `check`)
// =============================================================================

/// Where one item would be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDocument {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    pub locale: String,
    pub tags: Vec<String>,
    pub path: PathBuf,
}

/// Several items that resolve to the same output path; the last one written
/// wins.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCollision {
    pub path: PathBuf,
    /// Titles in write order.
    pub titles: Vec<String>,
}

/// Compute every output path without writing anything or touching the
/// network.
pub fn plan_documents(dataset: &Dataset, config: &ExportConfig) -> Vec<PlannedDocument> {
    collections(dataset)
        .into_iter()
        .flat_map(|(kind, items)| {
            items.iter().map(move |(id, item)| {
                let locale = item_locale(item, config);
                PlannedDocument {
                    kind,
                    id: id.clone(),
                    title: item.title.clone(),
                    locale: locale.to_string(),
                    tags: dataset.tags.resolve(&item.tags),
                    path: document_path(&config.output, kind, locale, &item.title),
                }
            })
        })
        .collect()
}

/// Output paths claimed by more than one item, sorted by path.
pub fn find_collisions(plan: &[PlannedDocument]) -> Vec<PathCollision> {
    let mut by_path: BTreeMap<&Path, Vec<String>> = BTreeMap::new();
    for doc in plan {
        by_path.entry(doc.path.as_path()).or_default().push(doc.title.clone());
    }
    by_path
        .into_iter()
        .filter(|(_, titles)| titles.len() > 1)
        .map(|(path, titles)| PathCollision {
            path: path.to_path_buf(),
            titles,
        })
        .collect()
}
