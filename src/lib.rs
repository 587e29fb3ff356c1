//! # strapi-md
//!
//! Converts a Strapi JSON database export into a tree of Markdown documents,
//! one per article or project, with front-matter and locally downloaded
//! images.
//!
//! # Pipeline
//!
//! ```text
//! strapi-db.json ─load─▶ Dataset ─export─▶ for each article, then each project:
//!                                            resolve tag names
//!                                            render blocks → Markdown (+ download images)
//!                                            write <kind>/<locale>/<slug>/index.md
//! ```
//!
//! Everything runs sequentially on one thread. Progress is reported as
//! [`export::ExportEvent`]s so the CLI can print while the export runs.
//!
//! # Output Layout
//!
//! ```text
//! <output>/
//!   articles/<locale>/<slug>/index.md
//!   articles/<locale>/<slug>/images/image-1.png
//!   projects/<locale>/<slug>/index.md
//! ```
//!
//! Slugs come from [`naming::sanitize_filename`]. Two titles with the same
//! slug in the same kind and locale write to the same file and the last one
//! wins; `strapi-md check` lists such collisions without writing anything.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dataset`] | Loads the export; collections in file order, tag lookup |
//! | [`types`] | `ContentItem`, `ItemKind`, tag records |
//! | [`blocks`] | Typed rich-text blocks and inline nodes |
//! | [`render`] | Block list → Markdown, downloading images as it goes |
//! | [`fetch`] | `ImageFetcher` trait and the blocking HTTP implementation |
//! | [`convert`] | One item → front-matter + body on disk |
//! | [`export`] | Whole-run orchestration, failure policy, output planning |
//! | [`naming`] | Title → slug, image base names |
//! | [`config`] | `strapi-md.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Unknown Data Degrades, Broken I/O Fails
//!
//! Strapi's rich-text schema grows over time. Block types this crate does not
//! know, and blocks whose fields have unexpected shapes, render as nothing
//! instead of failing the run. A failed image download drops only that image.
//! Failing to write a document stops the run, unless `on_item_error = "skip"`.
//!
//! ## Images Behind a Trait
//!
//! Rendering takes any [`fetch::ImageFetcher`], so the whole pipeline is
//! testable without network access; the CLI plugs in [`fetch::HttpFetcher`].

pub mod blocks;
pub mod config;
pub mod convert;
pub mod dataset;
pub mod export;
pub mod fetch;
pub mod naming;
pub mod output;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
