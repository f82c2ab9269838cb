//! Analytics sheet appends

use crate::error::StoreError;
use crate::sheets::{SharedValuesApi, ValuesApi};

/// The current 12-column audit shape.
pub const ANALYTICS_RANGE: &str = "ANALYTICS!A:L";

/// The legacy 6-column shape shortlink clicks still use.
pub const ANALYTICS_CLICK_RANGE: &str = "ANALYTICS!A:F";

#[derive(Clone)]
pub struct AnalyticsStore {
    api: SharedValuesApi,
}

impl AnalyticsStore {
    pub fn new(api: SharedValuesApi) -> Self {
        Self { api }
    }

    pub async fn append_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        self.api.append(ANALYTICS_RANGE, row).await?;
        Ok(())
    }

    pub async fn append_click_row(&self, row: Vec<String>) -> Result<(), StoreError> {
        self.api.append(ANALYTICS_CLICK_RANGE, row).await?;
        Ok(())
    }
}
