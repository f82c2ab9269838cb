//! The canonical event record
//!
//! An event's full payload lives in the `dataJson` cell of its row; the
//! structs here are that payload. Serialization is camelCase to match the
//! wire format consumed by the browser surfaces. `placements` is a sorted
//! map so the canonical JSON encoding (and therefore the strong ETag) is
//! deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Surface URLs derived from the event id and brand at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Links {
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub display_url: String,
    #[serde(default)]
    pub poster_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signup_url: Option<String>,
}

/// QR payloads are opaque data URLs minted by an external collaborator.
/// Empty strings mean "not generated yet".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qr {
    #[serde(default)]
    pub public: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub poster: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cta {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ctas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<Cta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Cta>,
}

/// Per-event toggles. The `show*` flags are latched on by the result merger
/// when the matching collection first becomes non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub show_schedule: bool,
    #[serde(default)]
    pub show_standings: bool,
    #[serde(default)]
    pub show_bracket: bool,
    #[serde(default)]
    pub show_sponsors: bool,
    #[serde(default)]
    pub public_enabled: bool,
    #[serde(default)]
    pub display_enabled: bool,
    #[serde(default)]
    pub poster_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub time: String,
    pub activity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub rank: u32,
    pub name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketMatch {
    pub id: String,
    pub round: u32,
    pub position: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score1: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracket {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub matches: Vec<BracketMatch>,
}

impl Bracket {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// A sponsor placed on one or more surfaces.
///
/// `placement` is the legacy single-surface field; `placements` is the newer
/// per-surface map (`mobileBanner`, `tvTop`, `tvSide`, `posterTop`, …).
/// Either may be present; filters honor both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sponsor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placements: Option<BTreeMap<String, bool>>,
}

impl Sponsor {
    /// Whether the per-surface map flags `key` on.
    pub fn placed(&self, key: &str) -> bool {
        self.placements
            .as_ref()
            .and_then(|m| m.get(key).copied())
            .unwrap_or(false)
    }
}

/// The canonical event record stored in the `dataJson` cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub brand_id: String,
    pub slug: String,
    pub event_tag: String,
    pub name: String,
    #[serde(rename = "startDateISO")]
    pub start_date_iso: String,
    pub venue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub qr: Qr,
    #[serde(default)]
    pub ctas: Ctas,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
    #[serde(default)]
    pub standings: Vec<Standing>,
    #[serde(default)]
    pub bracket: Bracket,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
    #[serde(rename = "createdAtISO")]
    pub created_at_iso: String,
    #[serde(rename = "updatedAtISO")]
    pub updated_at_iso: String,
}

/// The thin projection returned by the list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "startDateISO")]
    pub start_date_iso: String,
    pub venue: String,
    #[serde(rename = "updatedAtISO")]
    pub updated_at_iso: String,
}

impl From<&Event> for EventSummary {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.clone(),
            slug: e.slug.clone(),
            name: e.name.clone(),
            start_date_iso: e.start_date_iso.clone(),
            venue: e.venue.clone(),
            updated_at_iso: e.updated_at_iso.clone(),
        }
    }
}

impl Event {
    /// The duplicate-detection key: `(brandId, lower(trim(name)),
    /// startDateISO, lower(trim(venue)))`.
    pub fn idempotency_key(&self) -> (String, String, String, String) {
        idempotency_key(&self.brand_id, &self.name, &self.start_date_iso, &self.venue)
    }
}

/// Build an idempotency key from its raw parts.
pub fn idempotency_key(
    brand_id: &str,
    name: &str,
    start_date_iso: &str,
    venue: &str,
) -> (String, String, String, String) {
    (
        brand_id.to_string(),
        name.trim().to_lowercase(),
        start_date_iso.to_string(),
        venue.trim().to_lowercase(),
    )
}
