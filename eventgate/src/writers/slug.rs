//! Slug derivation
//!
//! Lowercase ASCII alphanumerics and hyphens only, runs of anything else
//! collapse to one hyphen, no leading or trailing hyphen, at most 50 chars,
//! `"event"` when nothing survives.

pub const MAX_SLUG_LEN: usize = 50;
pub const FALLBACK_SLUG: &str = "event";

pub fn to_slug(name: &str) -> String {
    let mut out = String::new();
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    out.truncate(MAX_SLUG_LEN);
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        out
    }
}
