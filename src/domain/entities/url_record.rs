//! URL record entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A stored short code → destination mapping with its access counter.
///
/// Invariants upheld by the service and the stores:
///
/// - `short_code` identifies at most one live record
/// - `access_count` never decreases while the record exists
/// - `updated_at >= created_at`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub access_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Builds a freshly inserted record: zero accesses, both timestamps equal.
    pub fn from_new(id: i64, new_record: NewUrlRecord) -> Self {
        Self {
            id,
            original_url: new_record.original_url,
            short_code: new_record.short_code,
            access_count: 0,
            created_at: new_record.created_at,
            updated_at: new_record.created_at,
        }
    }

    /// Applies a destination change, keeping `updated_at >= created_at`.
    pub fn apply(&mut self, patch: UrlPatch) {
        self.original_url = patch.original_url;
        self.updated_at = patch.updated_at.max(self.created_at);
    }
}

/// Input data for creating a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
}

/// Destination overwrite for an existing record.
///
/// `short_code`, `id`, `access_count` and `created_at` are never touched by an
/// update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPatch {
    pub original_url: String,
    pub updated_at: DateTime<Utc>,
}
