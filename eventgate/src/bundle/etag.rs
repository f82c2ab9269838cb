//! Strong ETags over canonical bundle JSON
//!
//! SHA-256 of the serialized bundle, first 64 bits, base64, quoted. Strong
//! (no `W/` prefix): the tag changes exactly when any projected field
//! changes. Determinism holds because bundle structs serialize with fixed
//! field order and sponsor `placements` is a sorted map.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute the quoted strong ETag for a bundle value.
pub fn strong_etag<T: Serialize>(value: &T) -> String {
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    format!("\"{}\"", STANDARD.encode(&digest[..8]))
}

/// `If-None-Match` comparison is exact string equality.
pub fn if_none_match_hits(header: Option<&str>, etag: &str) -> bool {
    header == Some(etag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Probe {
        name: &'static str,
        count: u32,
    }

    #[test]
    fn test_deterministic_across_calls() {
        let value = Probe { name: "trivia", count: 3 };
        assert_eq!(strong_etag(&value), strong_etag(&value));
    }

    #[test]
    fn test_changes_with_any_field() {
        let base = Probe { name: "trivia", count: 3 };
        let renamed = Probe { name: "quiz", count: 3 };
        let recounted = Probe { name: "trivia", count: 4 };
        assert_ne!(strong_etag(&base), strong_etag(&renamed));
        assert_ne!(strong_etag(&base), strong_etag(&recounted));
    }

    #[test]
    fn test_shape_is_quoted_strong() {
        let tag = strong_etag(&Probe { name: "t", count: 0 });
        assert!(tag.starts_with('"') && tag.ends_with('"'));
        assert!(!tag.starts_with("W/"));
        // 8 bytes of digest → 12 base64 chars
        assert_eq!(tag.len(), 14);
    }

    #[test]
    fn test_if_none_match_exact() {
        let tag = strong_etag(&Probe { name: "t", count: 0 });
        assert!(if_none_match_hits(Some(&tag), &tag));
        assert!(!if_none_match_hits(Some(tag.trim_matches('"')), &tag));
        assert!(!if_none_match_hits(None, &tag));
    }
}
