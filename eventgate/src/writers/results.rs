//! Result merging (schedule / standings / bracket)
//!
//! Load-merge-save: provided collections replace in full, the matching
//! `settings.show*` flag latches on when the collection is non-empty, and
//! the row is written back at the index observed by the load. The load and
//! save straddle a network round-trip, so merges serialize per event id on
//! the keyed lock; last-writer-wins across processes is accepted.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::model::event::{Bracket, Event, ScheduleItem, Standing};
use crate::store::EventStore;
use crate::sync::KeyedLocks;

use super::create::write_path_error;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsInput {
    #[serde(default)]
    pub schedule: Option<Vec<ScheduleItem>>,
    #[serde(default)]
    pub standings: Option<Vec<Standing>>,
    #[serde(default)]
    pub bracket: Option<Bracket>,
}

impl ResultsInput {
    pub fn is_empty(&self) -> bool {
        self.schedule.is_none() && self.standings.is_none() && self.bracket.is_none()
    }
}

#[derive(Clone)]
pub struct ResultMerger {
    events: EventStore,
    locks: KeyedLocks,
}

impl ResultMerger {
    pub fn new(events: EventStore, locks: KeyedLocks) -> Self {
        Self { events, locks }
    }

    pub async fn record(&self, event_id: &str, input: &ResultsInput) -> Result<Event, Error> {
        if input.is_empty() {
            return Err(Error::BadInput(
                "at least one of schedule, standings or bracket is required".to_string(),
            ));
        }

        let _guard = self
            .locks
            .acquire(&KeyedLocks::event_key(event_id))
            .await?;

        let stored = self
            .events
            .find_by_id(event_id)
            .await
            .map_err(write_path_error)?
            .ok_or_else(|| Error::EventNotFound(event_id.to_string()))?;

        let mut event = stored.event;
        apply(&mut event, input);
        event.updated_at_iso = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        self.events
            .update(stored.row_index, &event)
            .await
            .map_err(write_path_error)?;

        Ok(event)
    }
}

fn apply(event: &mut Event, input: &ResultsInput) {
    if let Some(schedule) = &input.schedule {
        if !schedule.is_empty() {
            event.settings.show_schedule = true;
        }
        event.schedule = schedule.clone();
    }
    if let Some(standings) = &input.standings {
        if !standings.is_empty() {
            event.settings.show_standings = true;
        }
        event.standings = standings.clone();
    }
    if let Some(bracket) = &input.bracket {
        if !bracket.is_empty() {
            event.settings.show_bracket = true;
        }
        event.bracket = bracket.clone();
    }
}
