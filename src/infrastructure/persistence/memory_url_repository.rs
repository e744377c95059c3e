//! In-memory implementation of the URL repository.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Process-local store keyed by short code.
///
/// Every mutation happens under the write lock, which makes insert-if-absent
/// and increments atomic. Records are lost when the process exits.
#[derive(Debug)]
pub struct InMemoryUrlRepository {
    records: RwLock<HashMap<String, UrlRecord>>,
    next_id: AtomicI64,
}

impl Default for InMemoryUrlRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, UrlRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, UrlRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError> {
        let mut records = self.write();

        match records.entry(new_record.short_code.clone()) {
            Entry::Occupied(_) => Err(AppError::duplicate_key(
                "Short code already exists",
                json!({ "short_code": new_record.short_code }),
            )),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let record = UrlRecord::from_new(id, new_record);
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError> {
        Ok(self.read().get(code).cloned())
    }

    async fn update(&self, code: &str, patch: UrlPatch) -> Result<UrlRecord, AppError> {
        let mut records = self.write();
        let record = records.get_mut(code).ok_or_else(|| not_found(code))?;

        record.apply(patch);
        Ok(record.clone())
    }

    async fn delete(&self, code: &str) -> Result<(), AppError> {
        self.write()
            .remove(code)
            .map(|_| ())
            .ok_or_else(|| not_found(code))
    }

    async fn increment_access_count(&self, code: &str) -> Result<(), AppError> {
        let mut records = self.write();
        let record = records.get_mut(code).ok_or_else(|| not_found(code))?;

        record.access_count += 1;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
