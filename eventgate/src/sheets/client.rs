//! Typed client for the spreadsheet values API
//!
//! Four operations over named ranges: read, batch read, append, update.
//! The transient error class (408/5xx/network) is retried with exponential
//! backoff and full jitter; everything else surfaces immediately as a
//! categorized [`StoreError`]. Error logs are structured and never include
//! the upstream response body.
//!
//! Row indices are 1-based and row 1 is the header. For this deployment the
//! sheet has a single writer per row and rows are only appended, so an index
//! observed immediately before an update stays valid across the update call.
//! Callers must still re-observe indices rather than cache them across
//! unrelated suspension points.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::SheetsConfig;
use crate::error::{StoreError, StoreErrorKind, StoreOperation};

use super::auth::TokenProvider;

/// Backoff base for the first retry.
const BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Backoff is capped here regardless of attempt count.
const BACKOFF_CAP: Duration = Duration::from_secs(16);

/// Result of an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    pub updated_rows: u64,
}

/// Result of an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub updated_rows: u64,
}

/// Store health probe result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub connected: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The adapter interface handlers and stores depend on. The production
/// implementation is [`SheetsClient`]; tests substitute an in-memory
/// backend.
#[async_trait]
pub trait ValuesApi: Send + Sync {
    /// Read a rectangular range (`SHEET!A:G`); header is the first row.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Read several ranges in one round-trip.
    async fn batch_get(&self, ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>, StoreError>;

    /// Append one row at the next empty slot of the named range.
    async fn append(&self, range: &str, row: Vec<String>) -> Result<AppendOutcome, StoreError>;

    /// Overwrite a specific 1-based row (row 1 is the header).
    async fn update(
        &self,
        sheet: &str,
        row_index: usize,
        row: Vec<String>,
    ) -> Result<UpdateOutcome, StoreError>;

    /// Whether credentials and the spreadsheet id are present.
    fn is_configured(&self) -> bool;

    /// Probe a trivial read and report connectivity.
    async fn health_check(&self) -> HealthReport;
}

enum Call<'a> {
    Get {
        range: &'a str,
    },
    Batch {
        ranges: &'a [String],
    },
    Append {
        range: &'a str,
        row: &'a [String],
    },
    Update {
        sheet: &'a str,
        row_index: usize,
        row: &'a [String],
    },
}

/// HTTP client for the values API with token caching and retries.
pub struct SheetsClient {
    config: SheetsConfig,
    http: reqwest::Client,
    auth: TokenProvider,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.call_timeout_secs))
            .build()
            .map_err(|_| {
                StoreError::internal(StoreOperation::Read, "failed to build HTTP client")
            })?;
        let auth = TokenProvider::new(config.clone(), http.clone());
        Ok(Self { config, http, auth })
    }

    fn values_url(&self, suffix: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values{}",
            self.config.api_base_url, self.config.spreadsheet_id, suffix
        )
    }

    fn ensure_configured(&self, op: StoreOperation) -> Result<(), StoreError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(StoreError::not_configured(
                op,
                "store credentials or spreadsheet id are missing",
            ))
        }
    }

    async fn attempt(&self, call: &Call<'_>, op: StoreOperation) -> Result<Value, StoreError> {
        let token = self.auth.get().await?;

        let request = match call {
            Call::Get { range } => self.http.get(self.values_url(&format!("/{range}"))),
            Call::Batch { ranges } => {
                let pairs: Vec<(&str, &str)> =
                    ranges.iter().map(|r| ("ranges", r.as_str())).collect();
                self.http
                    .get(format!(
                        "{}/v4/spreadsheets/{}/values:batchGet",
                        self.config.api_base_url, self.config.spreadsheet_id
                    ))
                    .query(&pairs)
            }
            Call::Append { range, row } => self
                .http
                .post(self.values_url(&format!("/{range}:append")))
                .query(&[
                    ("valueInputOption", "RAW"),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&json!({ "values": [row] })),
            Call::Update {
                sheet,
                row_index,
                row,
            } => {
                let range = row_range(sheet, *row_index, row.len());
                self.http
                    .put(self.values_url(&format!("/{range}")))
                    .query(&[("valueInputOption", "RAW")])
                    .json(&json!({ "values": [row] }))
            }
        };

        let response = request.bearer_auth(&token).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out"
            } else if e.is_connect() {
                "connection failed"
            } else {
                "request failed"
            };
            StoreError::transient(op, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            let kind = classify_status(status.as_u16());
            return Err(StoreError::new(
                op,
                kind,
                format!("upstream responded with status {}", status.as_u16()),
            ));
        }

        response
            .json::<Value>()
            .await
            .map_err(|_| StoreError::internal(op, "upstream response was not valid JSON"))
    }

    /// Run one call through the retry loop. Only the transient class is
    /// retried; backoff is exponential with full jitter.
    async fn dispatch(&self, op: StoreOperation, call: Call<'_>) -> Result<Value, StoreError> {
        self.ensure_configured(op)?;

        let started = Instant::now();
        let mut attempt: u32 = 0;
        loop {
            match self.attempt(&call, op).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retriable() && attempt < self.config.max_retries => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        r#type = "sheets",
                        operation = %op,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "transient store error, retrying: {}",
                        err.message
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    let err =
                        err.with_attempts(attempt, started.elapsed().as_millis() as u64);
                    tracing::error!(
                        r#type = "sheets",
                        operation = %err.operation,
                        code = %err.kind,
                        retries = err.retries,
                        latency_ms = err.latency_ms,
                        "store call failed: {}",
                        err.message
                    );
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl ValuesApi for SheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let value = self
            .dispatch(StoreOperation::Read, Call::Get { range })
            .await?;
        Ok(parse_rows(value.get("values")))
    }

    async fn batch_get(&self, ranges: &[String]) -> Result<Vec<Vec<Vec<String>>>, StoreError> {
        let value = self
            .dispatch(StoreOperation::BatchRead, Call::Batch { ranges })
            .await?;
        let ranges_out = value
            .get("valueRanges")
            .and_then(Value::as_array)
            .map(|vs| vs.iter().map(|v| parse_rows(v.get("values"))).collect())
            .unwrap_or_default();
        Ok(ranges_out)
    }

    async fn append(&self, range: &str, row: Vec<String>) -> Result<AppendOutcome, StoreError> {
        let value = self
            .dispatch(StoreOperation::Append, Call::Append { range, row: &row })
            .await?;
        let updated_rows = value
            .pointer("/updates/updatedRows")
            .and_then(Value::as_u64)
            .unwrap_or(1);
        Ok(AppendOutcome { updated_rows })
    }

    async fn update(
        &self,
        sheet: &str,
        row_index: usize,
        row: Vec<String>,
    ) -> Result<UpdateOutcome, StoreError> {
        let value = self
            .dispatch(
                StoreOperation::Update,
                Call::Update {
                    sheet,
                    row_index,
                    row: &row,
                },
            )
            .await?;
        let updated_rows = value
            .get("updatedRows")
            .and_then(Value::as_u64)
            .unwrap_or(1);
        Ok(UpdateOutcome { updated_rows })
    }

    fn is_configured(&self) -> bool {
        !self.config.client_email.is_empty()
            && !self.config.private_key_pem.is_empty()
            && !self.config.spreadsheet_id.is_empty()
    }

    async fn health_check(&self) -> HealthReport {
        if !self.is_configured() {
            return HealthReport {
                connected: false,
                latency_ms: 0,
                error: Some("not configured".to_string()),
            };
        }
        let started = Instant::now();
        match self.get_values("EVENTS!A1:A1").await {
            Ok(_) => HealthReport {
                connected: true,
                latency_ms: started.elapsed().as_millis() as u64,
                error: None,
            },
            Err(e) => HealthReport {
                connected: false,
                latency_ms: started.elapsed().as_millis() as u64,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Shared handle used across stores and handlers.
pub type SharedValuesApi = Arc<dyn ValuesApi>;

/// Classify an upstream HTTP status into the closed error set.
pub fn classify_status(status: u16) -> StoreErrorKind {
    match status {
        400 => StoreErrorKind::BadRange,
        401 => StoreErrorKind::Unauthorized,
        404 => StoreErrorKind::NotFound,
        408 => StoreErrorKind::UpstreamTransient,
        429 => StoreErrorKind::RateLimited,
        500..=599 => StoreErrorKind::UpstreamTransient,
        _ => StoreErrorKind::Internal,
    }
}

/// Exponential backoff with full jitter: uniform over `[0, min(cap, base·2^n)]`.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = BACKOFF_BASE
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(BACKOFF_CAP);
    let mut rng = rand::rng();
    Duration::from_millis(rng.random_range(0..=exp.as_millis() as u64))
}

/// `A1` range covering one whole row of `width` columns.
fn row_range(sheet: &str, row_index: usize, width: usize) -> String {
    let last = column_letter(width.max(1));
    format!("{sheet}!A{row_index}:{last}{row_index}")
}

fn column_letter(width: usize) -> char {
    // single-letter columns cover every sheet this gateway writes
    (b'A' + (width.min(26) as u8 - 1)) as char
}

fn parse_rows(values: Option<&Value>) -> Vec<Vec<String>> {
    values
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| cells.iter().map(cell_to_string).collect())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
