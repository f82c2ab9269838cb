//! Gateway status endpoint

use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use serde_json::json;

use crate::responses::{ApiOk, ROUTER_VERSION};
use crate::sheets::ValuesApi;
use crate::state::AppState;

static STARTED: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime clock to process start rather than the first status call.
pub fn mark_started() {
    Lazy::force(&STARTED);
}

pub async fn status(State(state): State<AppState>) -> Response {
    let store = state.api.health_check().await;
    ApiOk::new(json!({
        "service": state.config.service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "routerVersion": ROUTER_VERSION,
        "env": state.config.service.environment.analytics_env(),
        "configured": state.api.is_configured(),
        "store": store,
        "uptimeSecs": STARTED.elapsed().as_secs(),
        "logBuffered": state.log_buffer.len(),
    }))
    .into_response()
}
