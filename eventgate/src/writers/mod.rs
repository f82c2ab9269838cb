//! Write paths: event creation, result merging, analytics appends

pub mod analytics;
pub mod create;
pub mod results;
pub mod slug;

pub use analytics::{AnalyticsAppender, BatchOutcome};
pub use create::{CreateEventInput, CreateOutcome, EventCreator};
pub use results::{ResultMerger, ResultsInput};
pub use slug::to_slug;
