//! Read-side handlers: event lookups and the four bundle endpoints
//!
//! Bundles negotiate conditional GETs: the strong ETag of the composed
//! bundle is compared against `If-None-Match` by exact string equality,
//! and hits return 304 without a value. Lookups try the id first, then the
//! slug within the request's brand (old URLs predate ids).

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Extension;
use chrono::Utc;
use serde::Serialize;

use crate::brand::Brand;
use crate::bundle::{
    compose_admin, compose_display, compose_poster, compose_public, if_none_match_hits,
    strong_etag, AdminContext, Surface,
};
use crate::error::{Error, StoreError, StoreOperation};
use crate::middleware::RequestBrand;
use crate::model::event::{Event, EventSummary};
use crate::responses::{not_modified, ApiOk};
use crate::sheets::ValuesApi;
use crate::state::AppState;
use crate::store::events::EVENTS_RANGE;
use crate::store::shortlinks::SHORTLINKS_RANGE;
use crate::store::{EventStore, ShortlinkStore};

pub(crate) fn ensure_configured(state: &AppState) -> Result<(), Error> {
    if state.api.is_configured() {
        Ok(())
    } else {
        Err(StoreError::not_configured(
            StoreOperation::Read,
            "store credentials or spreadsheet id are missing",
        )
        .into())
    }
}

async fn lookup_event(state: &AppState, brand: &Brand, id: &str) -> Result<Event, Error> {
    if let Some(found) = state.events.find_by_id(id).await? {
        return Ok(found.event);
    }
    if let Some(found) = state.events.find_by_slug(brand.id, id).await? {
        return Ok(found.event);
    }
    Err(Error::EventNotFound(id.to_string()))
}

fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers.get("if-none-match").and_then(|v| v.to_str().ok())
}

/// ETag negotiation shared by every bundle endpoint.
fn conditional<T: Serialize>(bundle: T, surface: Surface, headers: &HeaderMap) -> Response {
    let etag = strong_etag(&bundle);
    if if_none_match_hits(if_none_match(headers), &etag) {
        return not_modified(&etag);
    }
    ApiOk::new(bundle)
        .with_etag(etag)
        .with_cache_control(surface.cache_control())
        .into_response()
}

pub async fn list_events(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let events = state.events.list_for_brand(brand.id).await?;
    let summaries: Vec<EventSummary> = events.iter().map(EventSummary::from).collect();
    Ok(ApiOk::new(summaries).into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Path(id): Path<String>,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let event = lookup_event(&state, brand, &id).await?;
    Ok(ApiOk::new(event).into_response())
}

pub async fn public_bundle(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let event = lookup_event(&state, brand, &id).await?;
    let bundle = compose_public(&event, brand, Utc::now().date_naive());
    Ok(conditional(bundle, Surface::Public, &headers))
}

pub async fn display_bundle(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let event = lookup_event(&state, brand, &id).await?;
    let bundle = compose_display(&event, brand);
    Ok(conditional(bundle, Surface::Display, &headers))
}

pub async fn poster_bundle(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let event = lookup_event(&state, brand, &id).await?;
    let bundle = compose_poster(&event, brand);
    Ok(conditional(bundle, Surface::Poster, &headers))
}

pub async fn admin_bundle(
    State(state): State<AppState>,
    Extension(RequestBrand(brand)): Extension<RequestBrand>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, Error> {
    ensure_configured(&state)?;

    // the console needs the event and its shortlinks: one batched read
    let ranges = [EVENTS_RANGE.to_string(), SHORTLINKS_RANGE.to_string()];
    let mut sheets = state.api.batch_get(&ranges).await?;
    let shortlink_rows = sheets.pop().unwrap_or_default();
    let event_rows = sheets.pop().unwrap_or_default();

    let stored = EventStore::find_in_rows(event_rows, brand.id, &id)?
        .ok_or_else(|| Error::EventNotFound(id.clone()))?;
    let shortlinks_count = ShortlinkStore::count_in_rows(&shortlink_rows, &stored.event.id);

    let bundle = compose_admin(
        &stored.event,
        brand,
        &AdminContext { shortlinks_count },
        Utc::now().date_naive(),
    );
    Ok(conditional(bundle, Surface::Admin, &headers))
}
