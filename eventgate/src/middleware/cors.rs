//! CORS preflight short-circuit and API allow-origin header
//!
//! The gateway serves browser clients on arbitrary origins, so the API
//! surface is wide open: `OPTIONS` short-circuits with 204 and the
//! preflight headers, and every API response carries
//! `Access-Control-Allow-Origin: *`. HTML pages get neither.

use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::brand;
use crate::responses::ALLOW_METHODS;

const MAX_AGE_SECS: &str = "86400";

fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        "access-control-max-age",
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    response
}

/// Whether the path targets the API, with or without a brand prefix.
fn is_api_path(path: &str) -> bool {
    if path == "/api" || path.starts_with("/api/") {
        return true;
    }
    brand::BRANDS.iter().any(|b| {
        let prefix = format!("/{}/api", b.id);
        path == prefix || path.starts_with(&format!("{prefix}/"))
    })
}

pub async fn cors_and_log(req: Request, next: Next) -> Response {
    tracing::debug!(method = %req.method(), uri = %req.uri(), "inbound request");

    if req.method() == Method::OPTIONS {
        return preflight();
    }

    let api = is_api_path(req.uri().path());
    let mut response = next.run(req).await;
    if api {
        response
            .headers_mut()
            .insert("access-control-allow-origin", HeaderValue::from_static("*"));
    }
    response
}
