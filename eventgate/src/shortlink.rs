//! Shortlink resolution
//!
//! Opaque token → 302 redirect, with a fire-and-forget analytics append.
//! Every failure mode fails closed to an HTML shell: invalid or unknown
//! tokens (and unexpected store errors) present as "Link Not Found"; a
//! stored target that is not an absolute http/https URL presents as a
//! generic failure, since that row is corrupt rather than missing.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::model::shortlink::is_valid_token;
use crate::pages;
use crate::state::AppState;

const NO_STORE: &str = "no-cache, no-store, must-revalidate";

/// How much of the token the echo header reveals.
const TOKEN_ECHO_LEN: usize = 8;

pub async fn resolve(
    state: &AppState,
    token: Option<String>,
    user_agent: &str,
    referer: &str,
) -> Response {
    let token = match token {
        Some(t) if is_valid_token(&t) => t,
        _ => return not_found(),
    };

    let link = match state.shortlinks.find_token(&token).await {
        Ok(Some(link)) => link,
        Ok(None) => return not_found(),
        Err(e) => {
            tracing::warn!(r#type = "shortlink", "lookup failed, degrading to 404: {e}");
            return not_found();
        }
    };

    let target = match parse_target(&link.target_url) {
        Some(url) => url,
        None => {
            tracing::warn!(r#type = "shortlink", token = %token, "stored target is not an absolute http(s) URL");
            return failure();
        }
    };

    // The redirect never waits on this.
    state.analytics.click_detached(
        link.event_id.clone(),
        link.sponsor_id.clone(),
        link.surface.clone(),
        token.clone(),
        user_agent.to_string(),
        referer.to_string(),
    );

    redirect(target.as_str(), &token)
}

fn parse_target(raw: &str) -> Option<reqwest::Url> {
    let url = reqwest::Url::parse(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

fn token_echo(token: &str) -> String {
    format!("{}...", token.chars().take(TOKEN_ECHO_LEN).collect::<String>())
}

fn redirect(location: &str, token: &str) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(location) {
        headers.insert(header::LOCATION, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    if let Ok(value) = HeaderValue::from_str(&token_echo(token)) {
        headers.insert("x-shortlink-token", value);
    }
    response
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::link_not_found_html())).into_response()
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(pages::link_failure_html()),
    )
        .into_response()
}
