//! HTTP response builders for the gateway's envelopes
//!
//! Every API response is a JSON envelope: `{ok:true, value, etag?}` on
//! success, `{ok:true, notModified:true, etag}` on a conditional hit, and
//! the error shape lives in [`crate::error`]. Router-level responses (404,
//! 405, panic recovery) use the flat `{ok:false, status, error, path?,
//! timestamp}` shape.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

/// Methods the gateway serves, advertised on 405s and preflights.
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Value of the `X-Router-Version` response header.
pub const ROUTER_VERSION: &str = concat!("eventgate/", env!("CARGO_PKG_VERSION"));

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// 200 OK envelope
// ============================================================================

/// Standard success envelope with optional ETag and cache policy.
#[derive(Debug)]
pub struct ApiOk<T> {
    value: T,
    etag: Option<String>,
    cache_control: Option<&'static str>,
    duplicate: bool,
}

impl<T: Serialize> ApiOk<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            etag: None,
            cache_control: None,
            duplicate: false,
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn with_cache_control(mut self, policy: &'static str) -> Self {
        self.cache_control = Some(policy);
        self
    }

    /// Mark the value as an idempotent duplicate (create path).
    pub fn duplicate(mut self) -> Self {
        self.duplicate = true;
        self
    }
}

impl<T: Serialize> IntoResponse for ApiOk<T> {
    fn into_response(self) -> Response {
        let mut body = json!({ "ok": true, "value": self.value });
        if let Some(etag) = &self.etag {
            body["etag"] = json!(etag);
        }
        if self.duplicate {
            body["duplicate"] = json!(true);
        }

        let mut response = (StatusCode::OK, Json(body)).into_response();
        if let Some(etag) = self.etag {
            if let Ok(value) = HeaderValue::from_str(&etag) {
                response.headers_mut().insert(header::ETAG, value);
            }
        }
        if let Some(policy) = self.cache_control {
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(policy));
        }
        response
    }
}

// ============================================================================
// 201 Created
// ============================================================================

/// HTTP 201 envelope with a `Location` header for the new resource.
#[derive(Debug)]
pub struct Created<T> {
    value: T,
    location: Option<String>,
}

impl<T: Serialize> Created<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let body = json!({ "ok": true, "value": self.value });
        let mut response = (StatusCode::CREATED, Json(body)).into_response();
        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }
        response
    }
}

// ============================================================================
// 304 Not Modified
// ============================================================================

/// Conditional-GET hit: the etag is echoed, the value is omitted.
pub fn not_modified(etag: &str) -> Response {
    let body = json!({ "ok": true, "notModified": true, "etag": etag });
    let mut response = (StatusCode::NOT_MODIFIED, Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(etag) {
        response.headers_mut().insert(header::ETAG, value);
    }
    response
}

// ============================================================================
// Router-level envelopes
// ============================================================================

/// `{ok:false, status, error, path?, timestamp}` for 404/405/panic.
pub fn router_error(status: StatusCode, error: &str, path: Option<&str>) -> Response {
    let mut body = json!({
        "ok": false,
        "status": status.as_u16(),
        "error": error,
        "timestamp": timestamp(),
    });
    if let Some(path) = path {
        body["path"] = json!(path);
    }
    (status, Json(body)).into_response()
}

/// Panic recovery: the handler blew up, render the generic 500 envelope.
pub fn panic_response(_err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    router_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        None,
    )
}
