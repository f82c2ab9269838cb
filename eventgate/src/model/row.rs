//! Codec between the canonical event record and its `EVENTS!A:G` row shape
//!
//! Columns 0..6: `id, brandId, templateId, dataJson, createdAtISO, slug,
//! updatedAtISO`. The `dataJson` cell carries the full payload; id, brand and
//! slug are duplicated as first-class columns so lookups can filter without
//! parsing every JSON blob.

use super::event::Event;

pub const COL_ID: usize = 0;
pub const COL_BRAND: usize = 1;
pub const COL_TEMPLATE: usize = 2;
pub const COL_DATA_JSON: usize = 3;
pub const COL_CREATED_AT: usize = 4;
pub const COL_SLUG: usize = 5;
pub const COL_UPDATED_AT: usize = 6;

pub const EVENT_ROW_WIDTH: usize = 7;

/// Outcome of decoding one data row.
#[derive(Debug)]
pub enum ParsedRow {
    /// A well-formed event.
    Event(Box<Event>),
    /// Row is missing `id` or `dataJson`; it carries no usable record.
    Missing,
    /// `dataJson` is present but not valid JSON for an event. The caller
    /// that was looking for this specific row must report an internal error
    /// rather than pretend the event does not exist.
    Corrupt { id: String, error: String },
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Decode one row. Rows without `id` or `dataJson` are discarded; malformed
/// JSON is reported as `Corrupt` and logged by the caller's scan.
pub fn parse_event_row(row: &[String]) -> ParsedRow {
    let id = cell(row, COL_ID);
    let data_json = cell(row, COL_DATA_JSON);
    if id.is_empty() || data_json.is_empty() {
        return ParsedRow::Missing;
    }
    match serde_json::from_str::<Event>(data_json) {
        Ok(event) => ParsedRow::Event(Box::new(event)),
        Err(e) => ParsedRow::Corrupt {
            id: id.to_string(),
            error: e.to_string(),
        },
    }
}

/// Encode an event as its row shape. Inverse of [`parse_event_row`] for
/// well-formed rows.
pub fn build_event_row(event: &Event) -> Vec<String> {
    let data_json = serde_json::to_string(event).unwrap_or_default();
    vec![
        event.id.clone(),
        event.brand_id.clone(),
        event.template_id.clone().unwrap_or_default(),
        data_json,
        event.created_at_iso.clone(),
        event.slug.clone(),
        event.updated_at_iso.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::sample_event;

    #[test]
    fn test_round_trip() {
        let event = sample_event();
        let row = build_event_row(&event);
        assert_eq!(row.len(), EVENT_ROW_WIDTH);
        assert_eq!(row[COL_ID], event.id);
        assert_eq!(row[COL_BRAND], "abc");
        assert_eq!(row[COL_SLUG], "trivia-night");

        match parse_event_row(&row) {
            ParsedRow::Event(back) => {
                assert_eq!(*back, event);
                assert_eq!(build_event_row(&back), row);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_id_discarded() {
        let mut row = build_event_row(&sample_event());
        row[COL_ID] = String::new();
        assert!(matches!(parse_event_row(&row), ParsedRow::Missing));
    }

    #[test]
    fn test_missing_data_json_discarded() {
        let mut row = build_event_row(&sample_event());
        row[COL_DATA_JSON] = String::new();
        assert!(matches!(parse_event_row(&row), ParsedRow::Missing));
    }

    #[test]
    fn test_short_row_discarded() {
        let row = vec!["evt-x".to_string()];
        assert!(matches!(parse_event_row(&row), ParsedRow::Missing));
    }

    #[test]
    fn test_corrupt_json_reported() {
        let mut row = build_event_row(&sample_event());
        row[COL_DATA_JSON] = "{not json".to_string();
        match parse_event_row(&row) {
            ParsedRow::Corrupt { id, .. } => assert_eq!(id, sample_event().id),
            other => panic!("expected corrupt, got {other:?}"),
        }
    }
}
