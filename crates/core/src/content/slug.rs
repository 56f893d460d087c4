/// URL slug derivation.
///
/// Slugs are derived once, when a draft is created: the title is lowercased,
/// runs of non-alphanumeric characters collapse into single hyphens, edge
/// hyphens are trimmed, and a millisecond timestamp is appended so two drafts
/// with the same title never collide. Editors may rewrite the slug later.
use chrono::{DateTime, Utc};

/// Derive a unique slug from a title at the given instant.
pub fn derive(title: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}", base(title), at.timestamp_millis())
}

/// The slugified title without the uniqueness suffix.
fn base(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Whether a hand-edited slug is acceptable: lowercase alphanumerics and
/// hyphens only, non-empty.
pub fn is_valid(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
