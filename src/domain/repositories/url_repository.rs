//! Repository trait for URL record persistence.

use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Persistence operations keyed by short code.
///
/// Implementations must enforce `short_code` uniqueness themselves (unique
/// index, insert-if-absent) and make [`Self::increment_access_count`] atomic,
/// since the service performs no locking of its own.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - Process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Inserts a new record and returns it with its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKey`] if the short code is already taken.
    /// Returns [`AppError::StoreUnavailable`] on connection failures.
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, AppError>;

    /// Finds a record by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(UrlRecord))` if found
    /// - `Ok(None)` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Overwrites the destination of a record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this code.
    async fn update(&self, code: &str, patch: UrlPatch) -> Result<UrlRecord, AppError>;

    /// Removes a record permanently.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this code.
    async fn delete(&self, code: &str) -> Result<(), AppError>;

    /// Atomically adds one to the access counter of a record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record has this code.
    async fn increment_access_count(&self, code: &str) -> Result<(), AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
