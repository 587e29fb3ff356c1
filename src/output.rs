//! CLI output formatting for the `export` and `check` commands.
//!
//! Every line leads with what the item *is* (kind and title, or the path it
//! produced); paths are shown relative to the output root so the listing
//! reads the same wherever the export lands.
//!
//! # Output Format
//!
//! ## Export
//!
//! ```text
//! Processing 2 articles...
//! Error downloading image https://cdn.example.com/a.png: HTTP status 404 Not Found
//! Created article: articles/en/my-post/index.md (1 image)
//! Created article: articles/fr/mon-article/index.md
//! Processing 1 project...
//! Failed project 'Tool': cannot create projects/en/tool: Permission denied
//!
//! Conversion complete. Output saved to ../markdown_export
//! 2 articles, 0 projects, 1 image (1 skipped), 1 failed
//! ```
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 My Post → articles/en/my-post/index.md
//!     Record: 1 (en)
//!     Tags: go, rust
//! 002 Hello, World → articles/en/hello-world/index.md
//!     Record: 4 (en)
//!
//! Projects
//! 001 Tool → projects/en/tool/index.md
//!     Record: 10 (en)
//!
//! Collisions
//! articles/en/hello-world/index.md
//!     Hello World
//!     Hello, World (kept)
//!
//! 3 documents, 1 collision
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::export::{ExportEvent, ExportSummary, PathCollision, PlannedDocument};
use crate::types::ItemKind;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// `1 image`, `2 images`.
fn count(n: usize, singular: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {singular}s")
    }
}

/// `path` relative to `root` with `/` separators, or as-is when outside it.
fn display_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn section_title(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Article => "Articles",
        ItemKind::Project => "Projects",
    }
}

// ============================================================================
// Export
// ============================================================================

/// Format a single export progress event as display lines.
pub fn format_export_event(event: &ExportEvent, output_root: &Path) -> Vec<String> {
    match event {
        ExportEvent::CollectionStarted { kind, count: n } => {
            vec![format!("Processing {}...", count(*n, kind.label()))]
        }
        ExportEvent::ItemWritten {
            kind, path, images, ..
        } => {
            let mut line = format!("Created {}: {}", kind.label(), display_path(path, output_root));
            if *images > 0 {
                line.push_str(&format!(" ({})", count(*images, "image")));
            }
            vec![line]
        }
        ExportEvent::ImageSkipped { url, reason, .. } => {
            vec![format!("Error downloading image {url}: {reason}")]
        }
        ExportEvent::ItemFailed { kind, title, error } => {
            vec![format!("Failed {} '{}': {}", kind.label(), title, error)]
        }
    }
}

/// Whether an event reports a problem (printed to stderr).
pub fn is_diagnostic(event: &ExportEvent) -> bool {
    matches!(
        event,
        ExportEvent::ImageSkipped { .. } | ExportEvent::ItemFailed { .. }
    )
}

pub fn print_export_event(event: &ExportEvent, output_root: &Path) {
    for line in format_export_event(event, output_root) {
        if is_diagnostic(event) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

/// Format the closing lines of an export run.
pub fn format_export_summary(summary: &ExportSummary, output_root: &Path) -> Vec<String> {
    let mut totals = format!(
        "{}, {}, {}",
        count(summary.articles, "article"),
        count(summary.projects, "project"),
        count(summary.images, "image"),
    );
    if summary.skipped_images > 0 {
        totals.push_str(&format!(" ({} skipped)", summary.skipped_images));
    }
    if summary.failed_items > 0 {
        totals.push_str(&format!(", {} failed", summary.failed_items));
    }
    vec![
        String::new(),
        format!("Conversion complete. Output saved to {}", output_root.display()),
        totals,
    ]
}

pub fn print_export_summary(summary: &ExportSummary, output_root: &Path) {
    for line in format_export_summary(summary, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the planned output tree and any path collisions.
pub fn format_check_output(
    plan: &[PlannedDocument],
    collisions: &[PathCollision],
    output_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();

    for kind in [ItemKind::Article, ItemKind::Project] {
        let docs: Vec<&PlannedDocument> = plan.iter().filter(|d| d.kind == kind).collect();
        if docs.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(section_title(kind).to_string());
        for (i, doc) in docs.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                doc.title,
                display_path(&doc.path, output_root)
            ));
            lines.push(format!("    Record: {} ({})", doc.id, doc.locale));
            if !doc.tags.is_empty() {
                lines.push(format!("    Tags: {}", doc.tags.join(", ")));
            }
        }
    }

    if !collisions.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Collisions".to_string());
        for collision in collisions {
            lines.push(display_path(&collision.path, output_root));
            let last = collision.titles.len().saturating_sub(1);
            for (i, title) in collision.titles.iter().enumerate() {
                if i == last {
                    lines.push(format!("    {} (kept)", title));
                } else {
                    lines.push(format!("    {}", title));
                }
            }
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "{}, {}",
        count(plan.len(), "document"),
        count(collisions.len(), "collision")
    ));
    lines
}

pub fn print_check_output(plan: &[PlannedDocument], collisions: &[PathCollision], output_root: &Path) {
    for line in format_check_output(plan, collisions, output_root) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn root() -> PathBuf {
        PathBuf::from("/out")
    }

    fn planned(kind: ItemKind, title: &str, rel: &str, tags: &[&str]) -> PlannedDocument {
        PlannedDocument {
            kind,
            id: "1".to_string(),
            title: title.to_string(),
            locale: rel.split('/').nth(1).unwrap_or("en").to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            path: root().join(rel),
        }
    }

    #[test]
    fn count_pluralizes() {
        assert_eq!(count(0, "image"), "0 images");
        assert_eq!(count(1, "image"), "1 image");
        assert_eq!(count(2, "article"), "2 articles");
    }

    #[test]
    fn display_path_strips_root() {
        let path = root().join("articles").join("en").join("a").join("index.md");
        assert_eq!(display_path(&path, &root()), "articles/en/a/index.md");
    }

    #[test]
    fn display_path_outside_root_unchanged() {
        assert_eq!(display_path(Path::new("elsewhere/x.md"), &root()), "elsewhere/x.md");
    }

    // =========================================================================
    // Export event formatting tests
    // =========================================================================

    #[test]
    fn format_collection_started() {
        let event = ExportEvent::CollectionStarted {
            kind: ItemKind::Article,
            count: 2,
        };
        assert_eq!(format_export_event(&event, &root()), vec!["Processing 2 articles..."]);

        let event = ExportEvent::CollectionStarted {
            kind: ItemKind::Project,
            count: 1,
        };
        assert_eq!(format_export_event(&event, &root()), vec!["Processing 1 project..."]);
    }

    #[test]
    fn format_item_written() {
        let event = ExportEvent::ItemWritten {
            kind: ItemKind::Article,
            title: "My Post".to_string(),
            path: root().join("articles/en/my-post/index.md"),
            images: 0,
        };
        assert_eq!(
            format_export_event(&event, &root()),
            vec!["Created article: articles/en/my-post/index.md"]
        );
    }

    #[test]
    fn format_item_written_with_images() {
        let event = ExportEvent::ItemWritten {
            kind: ItemKind::Project,
            title: "Tool".to_string(),
            path: root().join("projects/en/tool/index.md"),
            images: 3,
        };
        assert_eq!(
            format_export_event(&event, &root()),
            vec!["Created project: projects/en/tool/index.md (3 images)"]
        );
    }

    #[test]
    fn format_image_skipped_names_url_and_cause() {
        let event = ExportEvent::ImageSkipped {
            title: "Pics".to_string(),
            url: "https://cdn/a.png".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            format_export_event(&event, &root()),
            vec!["Error downloading image https://cdn/a.png: connection refused"]
        );
        assert!(is_diagnostic(&event));
    }

    #[test]
    fn format_item_failed() {
        let event = ExportEvent::ItemFailed {
            kind: ItemKind::Project,
            title: "Tool".to_string(),
            error: "disk full".to_string(),
        };
        assert_eq!(
            format_export_event(&event, &root()),
            vec!["Failed project 'Tool': disk full"]
        );
        assert!(is_diagnostic(&event));
    }

    #[test]
    fn format_summary_plain() {
        let summary = ExportSummary {
            articles: 2,
            projects: 1,
            images: 1,
            ..ExportSummary::default()
        };
        let lines = format_export_summary(&summary, Path::new("../markdown_export"));
        assert_eq!(lines[1], "Conversion complete. Output saved to ../markdown_export");
        assert_eq!(lines[2], "2 articles, 1 project, 1 image");
    }

    #[test]
    fn format_summary_with_problems() {
        let summary = ExportSummary {
            articles: 1,
            projects: 0,
            images: 2,
            skipped_images: 1,
            failed_items: 1,
        };
        let lines = format_export_summary(&summary, &root());
        assert_eq!(lines[2], "1 article, 0 projects, 2 images (1 skipped), 1 failed");
    }

    // =========================================================================
    // Check output tests
    // =========================================================================

    #[test]
    fn format_check_lists_sections() {
        let plan = vec![
            planned(ItemKind::Article, "My Post", "articles/en/my-post/index.md", &["go", "rust"]),
            PlannedDocument {
                id: "10".to_string(),
                ..planned(ItemKind::Project, "Outil", "projects/fr/outil/index.md", &[])
            },
        ];
        let lines = format_check_output(&plan, &[], &root());
        assert_eq!(
            lines,
            vec![
                "Articles",
                "001 My Post → articles/en/my-post/index.md",
                "    Record: 1 (en)",
                "    Tags: go, rust",
                "",
                "Projects",
                "001 Outil → projects/fr/outil/index.md",
                "    Record: 10 (fr)",
                "",
                "2 documents, 0 collisions",
            ]
        );
    }

    #[test]
    fn format_check_marks_kept_title() {
        let plan = vec![
            planned(ItemKind::Article, "Hello World", "articles/en/hello-world/index.md", &[]),
            planned(ItemKind::Article, "Hello, World", "articles/en/hello-world/index.md", &[]),
        ];
        let collisions = vec![PathCollision {
            path: root().join("articles/en/hello-world/index.md"),
            titles: vec!["Hello World".to_string(), "Hello, World".to_string()],
        }];
        let lines = format_check_output(&plan, &collisions, &root());
        let start = lines.iter().position(|l| l == "Collisions").unwrap();
        assert_eq!(lines[start + 1], "articles/en/hello-world/index.md");
        assert_eq!(lines[start + 2], "    Hello World");
        assert_eq!(lines[start + 3], "    Hello, World (kept)");
        assert_eq!(lines.last().unwrap(), "2 documents, 1 collision");
    }

    #[test]
    fn format_check_empty_dataset() {
        assert_eq!(format_check_output(&[], &[], &root()), vec!["0 documents, 0 collisions"]);
    }
}
