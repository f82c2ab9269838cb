//! Middleware modules: brand extraction, CORS, admin auth, request tracking

pub mod auth;
pub mod brand;
pub mod cors;
pub mod request_tracking;

pub use auth::{admin_guard, warn_if_open};
pub use brand::{brand_extract, normalize_path, RequestBrand};
pub use cors::cors_and_log;
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, router_version_layer,
    sensitive_headers_layer, SENSITIVE_HEADERS,
};
