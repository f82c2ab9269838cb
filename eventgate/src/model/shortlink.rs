//! Shortlink rows (`SHORTLINKS!A:G`)

/// Columns 0..6: `token, targetUrl, eventId, sponsorId, surface, createdAt,
/// brandId`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shortlink {
    pub token: String,
    pub target_url: String,
    pub event_id: String,
    pub sponsor_id: String,
    pub surface: String,
    pub created_at: String,
    pub brand_id: String,
}

pub const MIN_TOKEN_LEN: usize = 4;
pub const MAX_TOKEN_LEN: usize = 64;

/// Whether a query-supplied token is even worth looking up.
pub fn is_valid_token(token: &str) -> bool {
    (MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&token.len())
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

impl Shortlink {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let token = cell(row, 0);
        if token.is_empty() {
            return None;
        }
        Some(Self {
            token,
            target_url: cell(row, 1),
            event_id: cell(row, 2),
            sponsor_id: cell(row, 3),
            surface: cell(row, 4),
            created_at: cell(row, 5),
            brand_id: cell(row, 6),
        })
    }
}

/// Row 1 may or may not be a header; autodetect by lowercasing A1.
pub fn is_header_row(row: &[String]) -> bool {
    row.first()
        .map(|c| c.trim().eq_ignore_ascii_case("token"))
        .unwrap_or(false)
}
