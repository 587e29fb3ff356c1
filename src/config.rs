//! Export configuration.
//!
//! Settings live in an optional TOML file (`strapi-md.toml` by default). The
//! file is sparse: it is merged on top of the stock defaults, so it only needs
//! the keys it wants to change. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input = "strapi-db.json"       # Strapi export to read
//! output = "../markdown_export"  # Root of the Markdown tree
//! default_locale = "en"          # Locale for items that carry none
//! on_item_error = "abort"        # "abort" or "skip" when an item cannot be written
//!
//! [collections]
//! articles = "api::article.article"
//! projects = "api::project.project"
//! tags = "api::tag.tag"
//!
//! [images]
//! default_extension = ".jpg"     # Used when the URL path has no extension
//! timeout_secs = 60              # Per-download timeout, 0 = wait forever
//! user_agent = "strapi-md"
//! ```
//!
//! `--input` and `--output` on the command line win over the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "strapi-md.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Path of the Strapi JSON export.
    pub input: PathBuf,
    /// Root directory of the generated Markdown tree.
    pub output: PathBuf,
    /// Locale used for items whose `locale` is missing.
    pub default_locale: String,
    /// What to do when an item cannot be written.
    pub on_item_error: ItemErrorPolicy,
    /// Keys of the collections inside the export's `data` object.
    pub collections: CollectionsConfig,
    /// Image download settings.
    pub images: ImagesConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("strapi-db.json"),
            output: PathBuf::from("../markdown_export"),
            default_locale: "en".to_string(),
            on_item_error: ItemErrorPolicy::default(),
            collections: CollectionsConfig::default(),
            images: ImagesConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.images.default_extension;
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(ConfigError::Validation(
                "images.default_extension must look like \".jpg\"".into(),
            ));
        }
        if self.default_locale.is_empty() {
            return Err(ConfigError::Validation(
                "default_locale must not be empty".into(),
            ));
        }
        let c = &self.collections;
        if c.articles.is_empty() || c.projects.is_empty() || c.tags.is_empty() {
            return Err(ConfigError::Validation(
                "collections keys must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Policy for a fatal per-item error (the document could not be written).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemErrorPolicy {
    /// Stop the run at the first failed item.
    #[default]
    Abort,
    /// Report the failure and continue with the next item.
    Skip,
}

/// Collection keys in the export's `data` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectionsConfig {
    pub articles: String,
    pub projects: String,
    pub tags: String,
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            articles: "api::article.article".to_string(),
            projects: "api::project.project".to_string(),
            tags: "api::tag.tag".to_string(),
        }
    }
}

/// Image download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Extension (with the dot) used when the URL path has none.
    pub default_extension: String,
    /// Per-download timeout in seconds; `0` disables the timeout.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with downloads.
    pub user_agent: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            default_extension: ".jpg".to_string(),
            timeout_secs: 60,
            user_agent: concat!("strapi-md/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ImagesConfig {
    /// Timeout to hand to the HTTP client, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ExportConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Lay a user config file over the stock defaults.
///
/// The file only names what it changes: inside `[collections]` or `[images]`
/// each key is taken from the file when present and from `defaults`
/// otherwise. Anything that is not a table on both sides is replaced whole.
pub fn merge_toml(defaults: toml::Value, file: toml::Value) -> toml::Value {
    match (defaults, file) {
        (toml::Value::Table(mut merged), toml::Value::Table(file)) => {
            for (key, value) in file {
                let value = match merged.remove(&key) {
                    Some(default) => merge_toml(default, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            toml::Value::Table(merged)
        }
        (_, replacement) => replacement,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ExportConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ExportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
pub fn load_config(path: &Path) -> Result<ExportConfig, ConfigError> {
    resolve_config(load_raw_config(path)?)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# strapi-md configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Strapi JSON export to read.
input = "strapi-db.json"

# Root of the generated Markdown tree. Existing documents are overwritten.
output = "../markdown_export"

# Locale used for items that do not carry one.
default_locale = "en"

# What to do when a document cannot be written:
#   "abort" - stop the run (default)
#   "skip"  - report it and continue with the next item
on_item_error = "abort"

# ---------------------------------------------------------------------------
# Collections inside the export's "data" object
# ---------------------------------------------------------------------------
[collections]
articles = "api::article.article"
projects = "api::project.project"
tags = "api::tag.tag"

# ---------------------------------------------------------------------------
# Image downloads
# ---------------------------------------------------------------------------
[images]
# Extension used when an image URL has none in its path.
default_extension = ".jpg"

# Per-download timeout in seconds. 0 waits forever.
timeout_secs = 60

# User-Agent header sent with downloads.
# user_agent = "strapi-md/<version>"
"##
}
