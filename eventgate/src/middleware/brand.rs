//! Brand extraction and path normalization
//!
//! Runs before route matching: trailing slashes are stripped, an optional
//! leading brand segment (`/abc/display`) is removed from the path and
//! recorded as the request's brand, and a `?brand=` query parameter
//! overrides the path-derived value. Handlers read the result from the
//! [`RequestBrand`] extension; the fallback is the `root` brand.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::brand::{self, Brand};

/// The brand resolved for this request.
#[derive(Debug, Clone, Copy)]
pub struct RequestBrand(pub &'static Brand);

/// Strip a trailing slash; an empty path is `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn split_brand_prefix(path: &str) -> (Option<&'static Brand>, String) {
    let mut segments = path.trim_start_matches('/').splitn(2, '/');
    let first = segments.next().unwrap_or("");
    match brand::lookup(first) {
        Some(found) => {
            let rest = segments.next().unwrap_or("");
            let stripped = if rest.is_empty() {
                "/".to_string()
            } else {
                format!("/{rest}")
            };
            (Some(found), stripped)
        }
        None => (None, path.to_string()),
    }
}

/// Minimal query-string lookup with percent-decoding, for middleware that
/// runs before axum's extractors.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| percent_decode(v))
    })
}

fn percent_decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match u8::from_str_radix(&value[i + 1..i + 3], 16) {
                    Ok(byte) => {
                        out.push(byte);
                        i += 3;
                    }
                    Err(_) => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub async fn brand_extract(mut req: Request, next: Next) -> Response {
    let uri = req.uri().clone();
    let path = normalize_path(uri.path());

    let (path_brand, stripped) = split_brand_prefix(&path);
    let mut resolved = path_brand.unwrap_or_else(brand::root);

    if let Some(query_brand) = uri
        .query()
        .and_then(|q| query_param(q, "brand"))
        .and_then(|id| brand::lookup(&id))
    {
        resolved = query_brand;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{stripped}?{query}"),
        None => stripped,
    };
    if let Ok(new_uri) = rewritten.parse() {
        *req.uri_mut() = new_uri;
    }

    req.extensions_mut().insert(RequestBrand(resolved));
    next.run(req).await
}
