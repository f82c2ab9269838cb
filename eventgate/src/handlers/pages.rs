//! HTML page handlers for the alias table
//!
//! Thin shells per §pages; the public alias also honors the legacy
//! `?p=r` / `?p=redirect` dispatch into the shortlink resolver.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;

use crate::middleware::RequestBrand;
use crate::pages::{render, PageKind};
use crate::shortlink;
use crate::state::AppState;

pub(crate) fn user_agent(headers: &HeaderMap) -> &str {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub(crate) fn referer(headers: &HeaderMap) -> &str {
    headers
        .get("referer")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub(crate) fn token_param(params: &HashMap<String, String>) -> Option<String> {
    params.get("t").or_else(|| params.get("token")).cloned()
}

pub async fn public_page(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if matches!(params.get("p").map(String::as_str), Some("r" | "redirect")) {
        return shortlink::resolve(
            &state,
            token_param(&params),
            user_agent(&headers),
            referer(&headers),
        )
        .await;
    }
    Html(render(PageKind::Public, brand)).into_response()
}

pub async fn admin_page(
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
) -> Html<String> {
    Html(render(PageKind::Admin, brand))
}

pub async fn display_page(
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
) -> Html<String> {
    Html(render(PageKind::Display, brand))
}

pub async fn poster_page(
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
) -> Html<String> {
    Html(render(PageKind::Poster, brand))
}

pub async fn report_page(
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
) -> Html<String> {
    Html(render(PageKind::Report, brand))
}
