//! Access event model for asynchronous access counting.

use chrono::{DateTime, Utc};

/// A successful resolve waiting to be counted.
///
/// Created by [`crate::application::services::UrlService::resolve`] and sent
/// through a bounded channel to [`crate::domain::access_worker::run_access_worker`],
/// which decouples the response from the counter write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub short_code: String,
    pub accessed_at: DateTime<Utc>,
}

impl AccessEvent {
    pub fn new(short_code: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            accessed_at: Utc::now(),
        }
    }
}
