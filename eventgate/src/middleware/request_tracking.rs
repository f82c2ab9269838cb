//! Request id and router version headers
//!
//! Every response carries `X-Request-Id` (the upstream trace header when
//! present, a freshly minted `req-…` id otherwise) and `X-Router-Version`.
//! Sensitive request headers are masked in trace output.

use axum::http::{HeaderName, HeaderValue};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    sensitive_headers::SetSensitiveRequestHeadersLayer,
    set_header::SetResponseHeaderLayer,
};

use crate::ids::MakeGatewayRequestId;
use crate::responses::ROUTER_VERSION;

/// Headers masked in logs.
pub const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Generate `x-request-id` when the client didn't send one.
pub fn request_id_layer() -> SetRequestIdLayer<MakeGatewayRequestId> {
    SetRequestIdLayer::x_request_id(MakeGatewayRequestId)
}

/// Copy `x-request-id` onto the response.
pub fn request_id_propagation_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Stamp `X-Router-Version` on every response.
pub fn router_version_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-router-version"),
        HeaderValue::from_static(ROUTER_VERSION),
    )
}

/// Mask credentials in trace output.
pub fn sensitive_headers_layer() -> SetSensitiveRequestHeadersLayer {
    let headers = SENSITIVE_HEADERS
        .iter()
        .map(|h| h.parse().expect("valid header name"))
        .collect::<Vec<_>>();
    SetSensitiveRequestHeadersLayer::new(headers)
}
