//! Analytics rows (`ANALYTICS!A:L`) and the formula-injection sanitizer

use serde::Deserialize;

/// Maximum stored length for user-agent and referer strings.
pub const MAX_UA_LEN: usize = 200;

/// A request to record one analytics event. `event_id`, `surface` and
/// `metric` are required; everything else is optional client context.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInput {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub surface: String,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub sponsor_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub visible_sponsor_ids: Option<Vec<String>>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl TrackInput {
    pub fn new(event_id: &str, surface: &str, metric: &str) -> Self {
        Self {
            event_id: event_id.to_string(),
            surface: surface.to_string(),
            metric: metric.to_string(),
            ..Default::default()
        }
    }

    /// The three required fields must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("eventId", &self.event_id),
            ("surface", &self.surface),
            ("metric", &self.metric),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} is required"));
            }
        }
        Ok(())
    }
}

/// Neutralize spreadsheet formula interpretation: cells beginning with `=`,
/// `+`, `-`, `@`, tab, CR or LF get a single leading apostrophe.
pub fn sanitize_cell(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r' | '\n') => format!("'{value}"),
        _ => value.to_string(),
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Build the 12-column `ANALYTICS!A:L` row. Every cell is sanitized.
pub fn build_analytics_row(input: &TrackInput, timestamp: &str, env: &str) -> Vec<String> {
    let ua = truncate(input.user_agent.as_deref().unwrap_or(""), MAX_UA_LEN);
    let visible = input
        .visible_sponsor_ids
        .as_deref()
        .unwrap_or(&[])
        .join(",");
    [
        timestamp,
        input.event_id.as_str(),
        input.surface.as_str(),
        input.metric.as_str(),
        input.sponsor_id.as_deref().unwrap_or(""),
        input.value.as_deref().unwrap_or(""),
        input.token.as_deref().unwrap_or(""),
        ua.as_str(),
        input.session_id.as_deref().unwrap_or(""),
        visible.as_str(),
        "worker",
        env,
    ]
    .iter()
    .map(|cell| sanitize_cell(cell))
    .collect()
}

/// Build the legacy 6-column `ANALYTICS!A:F` shortlink-click row:
/// `timestamp, "shortlink_click", eventId, sponsorId, surface,
/// JSON{token, userAgent, referer}`.
pub fn build_click_row(
    timestamp: &str,
    event_id: &str,
    sponsor_id: &str,
    surface: &str,
    token: &str,
    user_agent: &str,
    referer: &str,
) -> Vec<String> {
    let detail = serde_json::json!({
        "token": token,
        "userAgent": truncate(user_agent, MAX_UA_LEN),
        "referer": truncate(referer, MAX_UA_LEN),
    })
    .to_string();
    [
        timestamp,
        "shortlink_click",
        event_id,
        sponsor_id,
        surface,
        detail.as_str(),
    ]
    .iter()
    .map(|cell| sanitize_cell(cell))
    .collect()
}
