//! Event repository over the values adapter
//!
//! Lookups filter on the first-class `id` / `brandId` / `slug` columns
//! before touching `dataJson`, so a corrupt payload elsewhere in the sheet
//! never breaks an unrelated request. A corrupt payload on the row a caller
//! actually asked for is an internal error, not a not-found.

use std::collections::HashSet;

use crate::error::{StoreError, StoreOperation};
use crate::model::event::Event;
use crate::model::row::{build_event_row, parse_event_row, ParsedRow, COL_BRAND, COL_ID, COL_SLUG};
use crate::sheets::{SharedValuesApi, ValuesApi};

pub const EVENTS_SHEET: &str = "EVENTS";
pub const EVENTS_RANGE: &str = "EVENTS!A:G";

/// An event together with the 1-based sheet row it was read from.
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub row_index: usize,
    pub event: Event,
}

/// The creator's view of one brand's rows: every occupied slug (even on
/// rows whose payload no longer parses) plus the parseable events.
#[derive(Debug, Default)]
pub struct BrandRows {
    pub slugs: HashSet<String>,
    pub events: Vec<StoredEvent>,
}

#[derive(Clone)]
pub struct EventStore {
    api: SharedValuesApi,
}

/// Attach 1-based sheet indices and drop the header (row 1).
fn index_rows(rows: Vec<Vec<String>>) -> Vec<(usize, Vec<String>)> {
    rows.into_iter()
        .enumerate()
        .skip(1)
        .map(|(i, row)| (i + 1, row))
        .collect()
}

fn parse_found(row_index: usize, row: &[String]) -> Result<Option<StoredEvent>, StoreError> {
    match parse_event_row(row) {
        ParsedRow::Event(event) => Ok(Some(StoredEvent {
            row_index,
            event: *event,
        })),
        ParsedRow::Missing => Ok(None),
        ParsedRow::Corrupt { id, error } => {
            tracing::warn!(row = row_index, event_id = %id, "event row is corrupt: {error}");
            Err(StoreError::internal(
                StoreOperation::Read,
                format!("stored record for {id} is corrupt"),
            ))
        }
    }
}

impl EventStore {
    pub fn new(api: SharedValuesApi) -> Self {
        Self { api }
    }

    /// Data rows with their 1-based sheet indices (row 1 is the header).
    async fn data_rows(&self) -> Result<Vec<(usize, Vec<String>)>, StoreError> {
        let rows = self.api.get_values(EVENTS_RANGE).await?;
        Ok(index_rows(rows))
    }

    /// Resolve `key` against an already-fetched `EVENTS!A:G` snapshot: by id
    /// first, then by slug within the brand. Used by callers that batch the
    /// event sheet together with other ranges.
    pub fn find_in_rows(
        rows: Vec<Vec<String>>,
        brand_id: &str,
        key: &str,
    ) -> Result<Option<StoredEvent>, StoreError> {
        let indexed = index_rows(rows);
        for (row_index, row) in &indexed {
            if cell(row, COL_ID) == key {
                return parse_found(*row_index, row);
            }
        }
        for (row_index, row) in &indexed {
            if cell(row, COL_BRAND) == brand_id && cell(row, COL_SLUG) == key {
                return parse_found(*row_index, row);
            }
        }
        Ok(None)
    }

    pub async fn list_for_brand(&self, brand_id: &str) -> Result<Vec<Event>, StoreError> {
        let mut events = Vec::new();
        for (row_index, row) in self.data_rows().await? {
            if cell(&row, COL_BRAND) != brand_id {
                continue;
            }
            match parse_event_row(&row) {
                ParsedRow::Event(event) => events.push(*event),
                ParsedRow::Missing => {}
                ParsedRow::Corrupt { id, error } => {
                    tracing::warn!(row = row_index, event_id = %id, "skipping corrupt event row: {error}");
                }
            }
        }
        Ok(events)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<StoredEvent>, StoreError> {
        for (row_index, row) in self.data_rows().await? {
            if cell(&row, COL_ID) == id {
                return parse_found(row_index, &row);
            }
        }
        Ok(None)
    }

    /// Slug lookup within a brand, for backward compatibility with URLs
    /// minted before ids existed.
    pub async fn find_by_slug(
        &self,
        brand_id: &str,
        slug: &str,
    ) -> Result<Option<StoredEvent>, StoreError> {
        for (row_index, row) in self.data_rows().await? {
            if cell(&row, COL_BRAND) == brand_id && cell(&row, COL_SLUG) == slug {
                return parse_found(row_index, &row);
            }
        }
        Ok(None)
    }

    /// One read serving both the duplicate check and the slug probe.
    pub async fn brand_rows(&self, brand_id: &str) -> Result<BrandRows, StoreError> {
        let mut out = BrandRows::default();
        for (row_index, row) in self.data_rows().await? {
            if cell(&row, COL_BRAND) != brand_id {
                continue;
            }
            let slug = cell(&row, COL_SLUG);
            if !slug.is_empty() {
                out.slugs.insert(slug.to_string());
            }
            match parse_event_row(&row) {
                ParsedRow::Event(event) => out.events.push(StoredEvent {
                    row_index,
                    event: *event,
                }),
                ParsedRow::Missing => {}
                ParsedRow::Corrupt { id, error } => {
                    tracing::warn!(row = row_index, event_id = %id, "skipping corrupt event row: {error}");
                }
            }
        }
        Ok(out)
    }

    pub async fn append(&self, event: &Event) -> Result<(), StoreError> {
        self.api
            .append(EVENTS_RANGE, build_event_row(event))
            .await?;
        Ok(())
    }

    pub async fn update(&self, row_index: usize, event: &Event) -> Result<(), StoreError> {
        self.api
            .update(EVENTS_SHEET, row_index, build_event_row(event))
            .await?;
        Ok(())
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}
