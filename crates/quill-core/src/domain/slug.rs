//! Slug derivation.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"));

/// Lower-case `text`, collapse every run outside `[a-z0-9]` into one `-`
/// and trim hyphens from both ends.
///
/// May return an empty string, e.g. for a title with no ASCII alphanumerics.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    NON_ALPHANUMERIC
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Slug for a post: [`slugify`] of the preferred source, never empty.
pub fn derive_slug(source: &str) -> String {
    let slug = slugify(source);
    if slug.is_empty() {
        let id = Uuid::new_v4().simple().to_string();
        format!("post-{}", &id[..8])
    } else {
        slug
    }
}
