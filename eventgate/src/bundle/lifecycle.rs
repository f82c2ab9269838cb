//! Event lifecycle phase derivation
//!
//! Pure date comparison in UTC: the date portion of `startDateISO` against
//! the date portion of "now". Unparseable or missing dates fall to
//! `pre-event`, never to an error.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    #[serde(rename = "pre-event")]
    PreEvent,
    #[serde(rename = "event-day")]
    EventDay,
    #[serde(rename = "post-event")]
    PostEvent,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreEvent => "pre-event",
            Self::EventDay => "event-day",
            Self::PostEvent => "post-event",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::PreEvent => "Coming Up",
            Self::EventDay => "Live Today",
            Self::PostEvent => "Event Ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleInfo {
    pub phase: Phase,
    pub label: &'static str,
    pub is_live: bool,
}

/// Derive the phase of an event starting on `start_date_iso` as of `today`.
pub fn lifecycle_phase(start_date_iso: &str, today: NaiveDate) -> LifecycleInfo {
    let phase = match NaiveDate::parse_from_str(start_date_iso.trim(), "%Y-%m-%d") {
        Ok(start) => {
            if today < start {
                Phase::PreEvent
            } else if today == start {
                Phase::EventDay
            } else {
                Phase::PostEvent
            }
        }
        Err(_) => Phase::PreEvent,
    };
    LifecycleInfo {
        phase,
        label: phase.label(),
        is_live: phase == Phase::EventDay,
    }
}
