//! Shortlink endpoint (`/r`, `/redirect`)

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::shortlink::resolve;
use crate::state::AppState;

use super::pages::{referer, token_param, user_agent};

pub async fn shortlink(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    resolve(
        &state,
        token_param(&params),
        user_agent(&headers),
        referer(&headers),
    )
    .await
}
