//! Best-effort analytics appends
//!
//! Appender failures never fail the triggering request: the detached
//! variants spawn the append and log at warn on failure. The batch variant
//! reports an aggregate outcome for callers that do want to know.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::WorkerEnv;
use crate::error::Error;
use crate::model::analytics::{build_analytics_row, build_click_row, TrackInput};
use crate::store::AnalyticsStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
}

#[derive(Clone)]
pub struct AnalyticsAppender {
    store: AnalyticsStore,
    env: &'static str,
}

impl AnalyticsAppender {
    pub fn new(store: AnalyticsStore, env: WorkerEnv) -> Self {
        Self {
            store,
            env: env.analytics_env(),
        }
    }

    /// Append one record, surfacing failures to the caller.
    pub async fn append(&self, input: &TrackInput) -> Result<(), Error> {
        input.validate().map_err(Error::BadInput)?;
        let timestamp = input
            .timestamp
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        let row = build_analytics_row(input, &timestamp, self.env);
        self.store.append_row(row).await?;
        Ok(())
    }

    /// Fire-and-forget append; the caller's response never waits on it.
    pub fn append_detached(&self, input: TrackInput) {
        let appender = self.clone();
        tokio::spawn(async move {
            if let Err(e) = appender.append(&input).await {
                tracing::warn!(metric = %input.metric, "analytics append dropped: {e}");
            }
        });
    }

    /// Append a batch concurrently; reports `(success, count, firstError?)`.
    pub async fn append_batch(&self, inputs: Vec<TrackInput>) -> BatchOutcome {
        let results =
            futures::future::join_all(inputs.iter().map(|input| self.append(input))).await;
        let count = results.iter().filter(|r| r.is_ok()).count();
        let first_error = results
            .into_iter()
            .find_map(|r| r.err())
            .map(|e| e.to_string());
        BatchOutcome {
            success: first_error.is_none(),
            count,
            first_error,
        }
    }

    /// Fire-and-forget shortlink click in the legacy 6-column shape.
    pub fn click_detached(
        &self,
        event_id: String,
        sponsor_id: String,
        surface: String,
        token: String,
        user_agent: String,
        referer: String,
    ) {
        let appender = self.clone();
        tokio::spawn(async move {
            let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
            let row = build_click_row(
                &timestamp,
                &event_id,
                &sponsor_id,
                &surface,
                &token,
                &user_agent,
                &referer,
            );
            if let Err(e) = appender.store.append_click_row(row).await {
                tracing::warn!(token = %token, "shortlink click append dropped: {e}");
            }
        });
    }
}
