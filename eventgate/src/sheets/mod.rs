//! Spreadsheet store adapter: token provider and values client

pub mod auth;
pub mod client;

pub use client::{
    AppendOutcome, HealthReport, SharedValuesApi, SheetsClient, UpdateOutcome, ValuesApi,
};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory stand-in for the values API used by store, writer and
    //! router tests. Sheets are plain row vectors; `EVENTS` and `ANALYTICS`
    //! always present a header row, `SHORTLINKS` returns exactly what the
    //! test seeded.

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{StoreError, StoreErrorKind, StoreOperation};
    use crate::model::row::build_event_row;
    use crate::model::event::Event;

    use super::client::{AppendOutcome, HealthReport, UpdateOutcome, ValuesApi};

    pub const EVENTS_HEADER: [&str; 7] = [
        "id",
        "brandId",
        "templateId",
        "dataJson",
        "createdAtISO",
        "slug",
        "updatedAtISO",
    ];

    #[derive(Default)]
    pub struct MemoryBackend {
        pub events: Mutex<Vec<Vec<String>>>,
        pub shortlinks: Mutex<Vec<Vec<String>>>,
        pub analytics: Mutex<Vec<Vec<String>>>,
        pub unconfigured: bool,
        pub fail_with: Mutex<Option<StoreErrorKind>>,
    }

    impl MemoryBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_events(events: &[Event]) -> Self {
            let backend = Self::new();
            {
                let mut rows = backend.events.lock().unwrap();
                for event in events {
                    rows.push(build_event_row(event));
                }
            }
            backend
        }

        pub fn seed_shortlink(&self, row: &[&str]) {
            self.shortlinks
                .lock()
                .unwrap()
                .push(row.iter().map(|s| s.to_string()).collect());
        }

        pub fn fail_next(&self, kind: StoreErrorKind) {
            *self.fail_with.lock().unwrap() = Some(kind);
        }

        fn take_failure(&self, op: StoreOperation) -> Result<(), StoreError> {
            if let Some(kind) = self.fail_with.lock().unwrap().take() {
                return Err(StoreError::new(op, kind, "forced test failure"));
            }
            Ok(())
        }

        fn sheet_of(range: &str) -> &str {
            range.split('!').next().unwrap_or(range)
        }

        fn read_sheet(&self, sheet: &str) -> Vec<Vec<String>> {
            match sheet {
                "EVENTS" => {
                    let mut rows =
                        vec![EVENTS_HEADER.iter().map(|s| s.to_string()).collect::<Vec<_>>()];
                    rows.extend(self.events.lock().unwrap().iter().cloned());
                    rows
                }
                "SHORTLINKS" => self.shortlinks.lock().unwrap().clone(),
                "ANALYTICS" => self.analytics.lock().unwrap().clone(),
                _ => Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ValuesApi for MemoryBackend {
        async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
            self.take_failure(StoreOperation::Read)?;
            Ok(self.read_sheet(Self::sheet_of(range)))
        }

        async fn batch_get(
            &self,
            ranges: &[String],
        ) -> Result<Vec<Vec<Vec<String>>>, StoreError> {
            self.take_failure(StoreOperation::BatchRead)?;
            Ok(ranges
                .iter()
                .map(|r| self.read_sheet(Self::sheet_of(r)))
                .collect())
        }

        async fn append(
            &self,
            range: &str,
            row: Vec<String>,
        ) -> Result<AppendOutcome, StoreError> {
            self.take_failure(StoreOperation::Append)?;
            match Self::sheet_of(range) {
                "EVENTS" => self.events.lock().unwrap().push(row),
                "SHORTLINKS" => self.shortlinks.lock().unwrap().push(row),
                "ANALYTICS" => self.analytics.lock().unwrap().push(row),
                other => {
                    return Err(StoreError::new(
                        StoreOperation::Append,
                        StoreErrorKind::BadRange,
                        format!("unknown sheet {other}"),
                    ))
                }
            }
            Ok(AppendOutcome { updated_rows: 1 })
        }

        async fn update(
            &self,
            sheet: &str,
            row_index: usize,
            row: Vec<String>,
        ) -> Result<UpdateOutcome, StoreError> {
            self.take_failure(StoreOperation::Update)?;
            if sheet != "EVENTS" || row_index < 2 {
                return Err(StoreError::new(
                    StoreOperation::Update,
                    StoreErrorKind::BadRange,
                    format!("bad update target {sheet}!{row_index}"),
                ));
            }
            let mut rows = self.events.lock().unwrap();
            let data_index = row_index - 2;
            if data_index >= rows.len() {
                return Err(StoreError::new(
                    StoreOperation::Update,
                    StoreErrorKind::BadRange,
                    format!("row {row_index} beyond sheet"),
                ));
            }
            rows[data_index] = row;
            Ok(UpdateOutcome { updated_rows: 1 })
        }

        fn is_configured(&self) -> bool {
            !self.unconfigured
        }

        async fn health_check(&self) -> HealthReport {
            HealthReport {
                connected: !self.unconfigured,
                latency_ms: 0,
                error: None,
            }
        }
    }
}
