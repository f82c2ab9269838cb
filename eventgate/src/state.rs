//! Shared application state

use std::sync::Arc;

use crate::config::Config;
use crate::observability::LogBuffer;
use crate::sheets::SharedValuesApi;
use crate::store::{AnalyticsStore, EventStore, ShortlinkStore};
use crate::sync::KeyedLocks;
use crate::writers::{AnalyticsAppender, EventCreator, ResultMerger};

/// Cloneable handle threaded through every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: SharedValuesApi,
    pub events: EventStore,
    pub shortlinks: ShortlinkStore,
    pub analytics: AnalyticsAppender,
    pub creator: EventCreator,
    pub merger: ResultMerger,
    pub log_buffer: LogBuffer,
}

impl AppState {
    pub fn new(config: Config, api: SharedValuesApi, log_buffer: LogBuffer) -> Self {
        let locks = KeyedLocks::default();
        let events = EventStore::new(api.clone());
        let shortlinks = ShortlinkStore::new(api.clone());
        let analytics = AnalyticsAppender::new(
            AnalyticsStore::new(api.clone()),
            config.service.environment,
        );
        let creator = EventCreator::new(
            events.clone(),
            locks.clone(),
            config.service.public_base_url.clone(),
        );
        let merger = ResultMerger::new(events.clone(), locks);

        Self {
            config: Arc::new(config),
            api,
            events,
            shortlinks,
            analytics,
            creator,
            merger,
            log_buffer,
        }
    }
}
