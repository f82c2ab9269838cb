//! Shortlink repository over the values adapter

use crate::error::StoreError;
use crate::model::shortlink::{is_header_row, Shortlink};
use crate::sheets::{SharedValuesApi, ValuesApi};

pub const SHORTLINKS_RANGE: &str = "SHORTLINKS!A:G";

#[derive(Clone)]
pub struct ShortlinkStore {
    api: SharedValuesApi,
}

impl ShortlinkStore {
    pub fn new(api: SharedValuesApi) -> Self {
        Self { api }
    }

    fn data_rows(rows: &[Vec<String>]) -> &[Vec<String>] {
        match rows.first() {
            Some(first) if is_header_row(first) => &rows[1..],
            _ => rows,
        }
    }

    /// Exact-match token lookup.
    pub async fn find_token(&self, token: &str) -> Result<Option<Shortlink>, StoreError> {
        let rows = self.api.get_values(SHORTLINKS_RANGE).await?;
        for row in Self::data_rows(&rows) {
            if let Some(link) = Shortlink::from_row(row) {
                if link.token == token {
                    return Ok(Some(link));
                }
            }
        }
        Ok(None)
    }

    /// Count within an already-fetched `SHORTLINKS!A:G` snapshot.
    pub fn count_in_rows(rows: &[Vec<String>], event_id: &str) -> usize {
        Self::data_rows(rows)
            .iter()
            .filter_map(|row| Shortlink::from_row(row))
            .filter(|link| link.event_id == event_id)
            .count()
    }

    /// How many shortlinks point at an event (admin diagnostics).
    pub async fn count_for_event(&self, event_id: &str) -> Result<usize, StoreError> {
        let rows = self.api.get_values(SHORTLINKS_RANGE).await?;
        Ok(Self::count_in_rows(&rows, event_id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sheets::testing::MemoryBackend;

    fn store() -> (Arc<MemoryBackend>, ShortlinkStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = ShortlinkStore::new(backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn test_find_token_with_header_row() {
        let (backend, store) = store();
        backend.seed_shortlink(&["token", "targetUrl", "eventId"]);
        backend.seed_shortlink(&["abc123", "https://target.example/", "evt-1", "", "promo"]);

        let link = store.find_token("abc123").await.unwrap().unwrap();
        assert_eq!(link.target_url, "https://target.example/");
        // the header row itself must never match
        assert!(store.find_token("token").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_token_without_header_row() {
        let (backend, store) = store();
        backend.seed_shortlink(&["abc123", "https://target.example/"]);
        assert!(store.find_token("abc123").await.unwrap().is_some());
        assert!(store.find_token("nope99").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_for_event() {
        let (backend, store) = store();
        backend.seed_shortlink(&["aaaa", "https://x/", "evt-1"]);
        backend.seed_shortlink(&["bbbb", "https://x/", "evt-1"]);
        backend.seed_shortlink(&["cccc", "https://x/", "evt-2"]);
        assert_eq!(store.count_for_event("evt-1").await.unwrap(), 2);
        assert_eq!(store.count_for_event("evt-9").await.unwrap(), 0);
    }
}
