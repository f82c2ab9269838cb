//! Admin auth guard
//!
//! A single shared bearer token per environment protects the admin API
//! surface (and the report pages, which render the same data). Rules in
//! order: an empty configured token passes everything (development mode),
//! then `Authorization: Bearer <t>`, then the legacy `?adminKey=<t>` query
//! parameter, then 401.

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::Config;
use crate::error::Error;
use crate::state::AppState;

use super::brand::query_param;

const REPORT_ALIASES: [&str; 4] = ["/report", "/analytics", "/reports", "/insights"];
const ADMIN_PAGE_ALIASES: [&str; 4] = ["/admin", "/manage", "/dashboard", "/create"];

/// Whether a (brand-stripped, normalized) path requires the admin token.
pub fn is_protected(path: &str, protect_admin_pages: bool) -> bool {
    if path == "/api/admin" || path.starts_with("/api/admin/") {
        return true;
    }
    if path.starts_with("/api/events/") && path.ends_with("/adminBundle") {
        return true;
    }
    if REPORT_ALIASES.contains(&path) {
        return true;
    }
    protect_admin_pages && ADMIN_PAGE_ALIASES.contains(&path)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// The ordered rule set. Returns `None` when the request may proceed.
pub fn check(
    config: &Config,
    path: &str,
    query: Option<&str>,
    headers: &HeaderMap,
) -> Option<Error> {
    if !is_protected(path, config.service.protect_admin_pages) {
        return None;
    }
    let expected = config.admin.token.as_str();
    if expected.is_empty() {
        return None;
    }
    if bearer_token(headers) == Some(expected) {
        return None;
    }
    if query
        .and_then(|q| query_param(q, "adminKey"))
        .is_some_and(|t| t == expected)
    {
        return None;
    }
    Some(Error::Unauthorized(
        "Missing or invalid authentication".to_string(),
    ))
}

pub async fn admin_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(|q| q.to_string());
    if let Some(rejection) = check(&state.config, &path, query.as_deref(), req.headers()) {
        return rejection.into_response();
    }
    next.run(req).await
}

/// Called once at startup: an open admin surface is fine in dev, an
/// incident anywhere else.
pub fn warn_if_open(config: &Config) {
    if config.admin.token.is_empty() && !config.service.environment.is_dev() {
        tracing::warn!(
            env = config.service.environment.analytics_env(),
            "ADMIN_TOKEN is empty outside dev: admin routes are unprotected"
        );
    }
}
