//! Admin write handlers: create event, record results
//!
//! Writer outcomes map onto HTTP: a fresh create is 201 with a `Location`,
//! an idempotent duplicate is 200 with `duplicate:true`, validation is 400,
//! and a lock timeout is 503 `BUSY`. Successful writes audit themselves
//! through the best-effort analytics appender after the store write.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::error::Error;
use crate::model::analytics::TrackInput;
use crate::responses::{ApiOk, Created};
use crate::state::AppState;
use crate::writers::{CreateEventInput, ResultsInput};

use super::events::ensure_configured;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|e| Error::BadInput(format!("invalid JSON body: {e}")))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventInput>, JsonRejection>,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let input = body(payload)?;
    let outcome = state.creator.create(&input).await?;

    if outcome.duplicate {
        return Ok(ApiOk::new(outcome.event).duplicate().into_response());
    }

    state
        .analytics
        .append_detached(TrackInput::new(&outcome.event.id, "admin", "event_created"));

    let location = format!("/api/events/{}", outcome.event.id);
    Ok(Created::new(outcome.event)
        .with_location(location)
        .into_response())
}

pub async fn record_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ResultsInput>, JsonRejection>,
) -> Result<Response, Error> {
    ensure_configured(&state)?;
    let input = body(payload)?;
    let event = state.merger.record(&id, &input).await?;

    state
        .analytics
        .append_detached(TrackInput::new(&event.id, "admin", "results_recorded"));

    Ok(ApiOk::new(event).into_response())
}
