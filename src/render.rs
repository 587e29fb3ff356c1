//! Rich-text blocks → Markdown.
//!
//! Rendering is a single pass over the block list. Every block's Markdown is
//! followed by a blank line, so the output is a sequence of paragraphs:
//!
//! | Block | Markdown |
//! |---|---|
//! | heading (level n) | `### text` (n hashes, raw text only) |
//! | paragraph | inline runs with `**`, `*`, `<u>`, `` ` `` wrapping; links as `[text](url)` |
//! | image | `![caption](images/image-N.ext)` after a successful download |
//! | code | fenced block tagged with the language |
//! | quote | `> text` |
//! | list | `1. item` / `- item`, one line per item |
//!
//! Headings, quotes, list items and link texts use the *raw* text of their
//! children: formatting flags only apply to top-level paragraph runs.
//!
//! ## Images
//!
//! Image blocks are the only side effect. Each one with a URL is handed to the
//! [`ImageFetcher`] as `image-N`, where `N` counts successful downloads in
//! this document starting at 1. A failed download contributes nothing and
//! does not advance `N`; the failure is returned in
//! [`RenderOutput::skipped_images`] for the caller to report.

use crate::blocks::{Block, Inline, InlineKind, ListFormat, ListItem, plain_text};
use crate::fetch::ImageFetcher;
use crate::naming::image_base_name;
use std::path::{Component, Path};

/// Result of rendering one document body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOutput {
    pub markdown: String,
    /// Number of images downloaded and referenced.
    pub images_written: usize,
    /// Images left out because their download failed.
    pub skipped_images: Vec<SkippedImage>,
}

/// An image reference that could not be materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedImage {
    pub url: String,
    pub reason: String,
}

/// Render `blocks` to Markdown, downloading images into `images_dir`.
///
/// Image references in the output are relative to the parent of
/// `images_dir`, i.e. the folder holding the document.
pub fn render_blocks(
    blocks: &[Block],
    images_dir: &Path,
    fetcher: &impl ImageFetcher,
) -> RenderOutput {
    let mut renderer = BlockRenderer {
        images_dir,
        fetcher,
        next_image: 1,
        output: RenderOutput::default(),
    };
    for block in blocks {
        renderer.render_block(block);
    }
    renderer.output
}

struct BlockRenderer<'a, F: ImageFetcher> {
    images_dir: &'a Path,
    fetcher: &'a F,
    /// Number given to the next successfully downloaded image.
    next_image: usize,
    output: RenderOutput,
}

impl<F: ImageFetcher> BlockRenderer<'_, F> {
    fn render_block(&mut self, block: &Block) {
        let markdown = match block {
            Block::Heading { level, children } => Some(render_heading(level.unwrap_or(1), children)),
            Block::Paragraph { children } => Some(render_paragraph(children)),
            Block::Image { image: Some(image) } => {
                let caption = [&image.alternative_text, &image.caption]
                    .into_iter()
                    .flatten()
                    .find(|s| !s.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("Image {}", self.next_image));
                match image.url.as_deref() {
                    Some(url) if !url.is_empty() => self.render_image(url, &caption),
                    _ => None,
                }
            }
            Block::Image { image: None } => None,
            Block::Code {
                code,
                language,
                children,
            } => {
                let code = code.clone().unwrap_or_else(|| plain_text(children));
                Some(render_code(&code, language.as_deref().unwrap_or_default()))
            }
            Block::Quote { children } => Some(render_quote(children)),
            Block::List { format, children } => {
                Some(render_list(*format == Some(ListFormat::Ordered), children))
            }
            Block::Unsupported => None,
        };
        if let Some(markdown) = markdown {
            self.output.markdown.push_str(&markdown);
        }
    }

    fn render_image(&mut self, url: &str, caption: &str) -> Option<String> {
        let base_name = image_base_name(self.next_image);
        match self.fetcher.fetch(url, self.images_dir, &base_name) {
            Ok(local_path) => {
                self.next_image += 1;
                self.output.images_written += 1;
                let link = relative_image_path(&local_path, self.images_dir);
                Some(format!("![{caption}]({link})\n\n"))
            }
            Err(e) => {
                self.output.skipped_images.push(SkippedImage {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

/// `#`-prefixed heading from the children's raw text.
pub fn render_heading(level: u8, children: &[Inline]) -> String {
    format!("{} {}\n\n", "#".repeat(usize::from(level)), plain_text(children))
}

/// Paragraph from its inline runs, concatenated without separators.
pub fn render_paragraph(children: &[Inline]) -> String {
    let text: String = children.iter().map(render_inline).collect();
    format!("{text}\n\n")
}

/// One paragraph run.
///
/// Text runs are wrapped bold → italic → underline → code, each wrapping the
/// previous result, so bold+italic gives `***text***`. A link renders as
/// `[text](url)` from its children's raw text; its own flags are ignored.
pub fn render_inline(child: &Inline) -> String {
    if child.kind == InlineKind::Link {
        return format!("[{}]({})", plain_text(&child.children), child.url);
    }
    let mut text = child.text.clone();
    if child.bold {
        text = format!("**{text}**");
    }
    if child.italic {
        text = format!("*{text}*");
    }
    if child.underline {
        text = format!("<u>{text}</u>");
    }
    if child.code {
        text = format!("`{text}`");
    }
    text
}

pub fn render_code(code: &str, language: &str) -> String {
    format!("```{language}\n{code}\n```\n\n")
}

pub fn render_quote(children: &[Inline]) -> String {
    format!("> {}\n\n", plain_text(children))
}

/// List items one per line; ordered lists count from 1 within this list.
pub fn render_list(ordered: bool, items: &[ListItem]) -> String {
    let mut markdown = String::new();
    for (i, item) in items.iter().enumerate() {
        let text = plain_text(&item.children);
        if ordered {
            markdown.push_str(&format!("{}. {text}\n", i + 1));
        } else {
            markdown.push_str(&format!("- {text}\n"));
        }
    }
    markdown.push('\n');
    markdown
}

/// Path of `local` relative to the folder containing `images_dir`, with `/`
/// separators for use in Markdown.
fn relative_image_path(local: &Path, images_dir: &Path) -> String {
    let base = images_dir.parent().unwrap_or(images_dir);
    let relative = local.strip_prefix(base).unwrap_or(local);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
