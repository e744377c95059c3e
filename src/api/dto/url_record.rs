//! JSON representation of a URL record.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::UrlRecord;

/// Response body for every endpoint returning a record.
///
/// Timestamps serialize as RFC 3339 strings.
///
/// ```json
/// {
///   "id": 1,
///   "original_url": "https://example.com",
///   "short_code": "Ab3xY9",
///   "access_count": 0,
///   "created_at": "2025-01-01T12:00:00Z",
///   "updated_at": "2025-01-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct UrlRecordResponse {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UrlRecord> for UrlRecordResponse {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            original_url: record.original_url,
            short_code: record.short_code,
            access_count: record.access_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
