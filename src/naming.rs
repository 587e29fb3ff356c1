//! Filesystem names derived from content titles.
//!
//! Every exported item lives in a folder named after its title. The folder
//! name is the title's *slug*: lowercase, spaces turned into hyphens, and
//! anything else that is not a word character or hyphen dropped.
//!
//! - `"My Post"` → `my-post`
//! - `"Hello World!"` → `hello-world`
//! - `"C'est l'été"` → `cest-lété`
//!
//! Dropped characters leave no trace, so `"Rust/Go"` becomes `rustgo`. Two
//! titles that differ only in punctuation therefore share a folder.

/// Convert a title into a filesystem-safe slug.
///
/// Idempotent: a string that is already a slug comes back unchanged.
pub fn sanitize_filename(title: &str) -> String {
    title
        .replace(' ', "-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Base name (no extension) of the `n`-th image downloaded for an item.
pub fn image_base_name(n: usize) -> String {
    format!("image-{n}")
}
