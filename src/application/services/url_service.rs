//! URL lifecycle service: create, resolve, update, delete and stats.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{error, info, warn};

use crate::domain::access_event::AccessEvent;
use crate::domain::entities::{NewUrlRecord, UrlPatch, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, RandomCodeGenerator, is_valid_code};
use crate::utils::url_validator::validate_url;

/// Default number of codes tried before giving up on a create.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Default upper bound for a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates validation, code generation and persistence of URL records.
///
/// The service keeps no mutable state of its own: uniqueness and counters are
/// delegated to the store's atomic operations, so a single instance can be
/// shared by every request.
///
/// Access counting on [`Self::resolve`] is fire-and-forget. The event is
/// pushed to a bounded queue drained by
/// [`crate::domain::access_worker::run_access_worker`]; a full or closed queue
/// is logged and the resolve still succeeds.
pub struct UrlService<R: UrlRepository + ?Sized> {
    repository: Arc<R>,
    generator: Arc<dyn CodeGenerator>,
    access_sender: mpsc::Sender<AccessEvent>,
    max_attempts: usize,
    store_timeout: Duration,
}

impl<R: UrlRepository + ?Sized> UrlService<R> {
    /// Creates a service with a random code generator and default limits.
    pub fn new(repository: Arc<R>, access_sender: mpsc::Sender<AccessEvent>) -> Self {
        Self {
            repository,
            generator: Arc::new(RandomCodeGenerator),
            access_sender,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Replaces the code generator.
    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Sets how many codes are tried before [`AppError::CodeSpaceExhausted`].
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the upper bound for each store call.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Shortens `original_url`.
    ///
    /// # Collision handling
    ///
    /// The store reports a taken code as [`AppError::DuplicateKey`]; the service
    /// then draws a fresh code, up to `max_attempts` times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is rejected (nothing is stored).
    /// Returns [`AppError::CodeSpaceExhausted`] if every attempt collided.
    /// Returns [`AppError::StoreUnavailable`] on store failure or timeout.
    pub async fn create(&self, original_url: &str) -> Result<UrlRecord, AppError> {
        validate_url(original_url)?;
        let original_url = original_url.trim();

        for attempt in 1..=self.max_attempts {
            let new_record = NewUrlRecord {
                original_url: original_url.to_string(),
                short_code: self.generator.generate(),
                created_at: Utc::now(),
            };
            let short_code = new_record.short_code.clone();

            match self
                .bounded("insert", self.repository.insert(new_record))
                .await
            {
                Ok(record) => {
                    metrics::counter!("urls_created_total").increment(1);
                    info!(short_code = %record.short_code, id = record.id, "Short URL created");
                    return Ok(record);
                }
                Err(AppError::DuplicateKey { .. }) => {
                    metrics::counter!("short_code_collisions_total").increment(1);
                    warn!(%short_code, attempt, "Short code collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            max_attempts = self.max_attempts,
            "Exhausted short code generation attempts"
        );
        Err(AppError::code_space_exhausted(
            "Failed to generate unique short code",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    /// Looks up a record and counts the access.
    ///
    /// Returns the record as fetched; the increment lands asynchronously and
    /// is not reflected in the returned `access_count`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn resolve(&self, code: &str) -> Result<UrlRecord, AppError> {
        let record = self.find(code).await?;
        self.record_access(&record.short_code);
        Ok(record)
    }

    /// Looks up a record without touching its counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn stats(&self, code: &str) -> Result<UrlRecord, AppError> {
        self.find(code).await
    }

    /// Points an existing short code at a new destination.
    ///
    /// Only `original_url` and `updated_at` change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the new URL is rejected.
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn update(&self, code: &str, new_original_url: &str) -> Result<UrlRecord, AppError> {
        validate_url(new_original_url)?;
        ensure_well_formed(code)?;

        let patch = UrlPatch {
            original_url: new_original_url.trim().to_string(),
            updated_at: Utc::now(),
        };

        let record = self
            .bounded("update", self.repository.update(code, patch))
            .await?;

        info!(short_code = %record.short_code, "Short URL updated");
        Ok(record)
    }

    /// Removes a record permanently.
    ///
    /// Not idempotent: deleting an already deleted code fails.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown.
    pub async fn delete(&self, code: &str) -> Result<(), AppError> {
        ensure_well_formed(code)?;
        self.bounded("delete", self.repository.delete(code)).await?;

        info!(short_code = %code, "Short URL deleted");
        Ok(())
    }

    /// Checks that the store answers within the timeout.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.bounded("ping", self.repository.ping()).await
    }

    /// Returns true while the access worker is still receiving events.
    pub fn access_queue_open(&self) -> bool {
        !self.access_sender.is_closed()
    }

    /// Free slots in the access queue.
    pub fn access_queue_capacity(&self) -> usize {
        self.access_sender.capacity()
    }

    async fn find(&self, code: &str) -> Result<UrlRecord, AppError> {
        ensure_well_formed(code)?;

        self.bounded("find_by_code", self.repository.find_by_code(code))
            .await?
            .ok_or_else(|| not_found(code))
    }

    fn record_access(&self, code: &str) {
        match self.access_sender.try_send(AccessEvent::new(code)) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("access_increments_dropped_total").increment(1);
                warn!(short_code = %event.short_code, "Access queue full, dropping increment");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("access_increments_dropped_total").increment(1);
                error!(short_code = %event.short_code, "Access queue closed, dropping increment");
            }
        }
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, AppError>>,
    ) -> Result<T, AppError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(AppError::store_unavailable(
                    "Store call timed out",
                    json!({ "operation": operation }),
                ))
            }
        }
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found("Short URL not found", json!({ "short_code": code }))
}

/// A code that could never have been generated cannot exist in the store.
fn ensure_well_formed(code: &str) -> Result<(), AppError> {
    if is_valid_code(code) {
        Ok(())
    } else {
        Err(not_found(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockUrlRepository;
    use crate::utils::code_generator::{CODE_LENGTH, MockCodeGenerator};
    use mockall::Sequence;

    fn record(id: i64, code: &str, url: &str) -> UrlRecord {
        UrlRecord::from_new(
            id,
            NewUrlRecord {
                original_url: url.to_string(),
                short_code: code.to_string(),
                created_at: Utc::now(),
            },
        )
    }

    fn service(
        repo: MockUrlRepository,
    ) -> (UrlService<MockUrlRepository>, mpsc::Receiver<AccessEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (UrlService::new(Arc::new(repo), tx), rx)
    }

    #[tokio::test]
    async fn test_create_success() {
        let mut repo = MockUrlRepository::new();
        repo.expect_insert()
            .withf(|new_record| {
                new_record.original_url == "https://example.com"
                    && new_record.short_code.len() == CODE_LENGTH
            })
            .times(1)
            .returning(|new_record| Ok(UrlRecord::from_new(1, new_record)));

        let (service, _rx) = service(repo);

        let created = service.create("https://example.com").await.unwrap();

        assert_eq!(created.original_url, "https://example.com");
        assert_eq!(created.access_count, 0);
        assert_eq!(created.created_at, created.updated_at);
        assert!(is_valid_code(&created.short_code));
    }

    #[tokio::test]
    async fn test_create_trims_whitespace() {
        let mut repo = MockUrlRepository::new();
        repo.expect_insert()
            .withf(|new_record| new_record.original_url == "https://example.com/a")
            .times(1)
            .returning(|new_record| Ok(UrlRecord::from_new(1, new_record)));

        let (service, _rx) = service(repo);

        let created = service.create("  https://example.com/a \n").await.unwrap();
        assert_eq!(created.original_url, "https://example.com/a");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_urls_without_storing() {
        let mut repo = MockUrlRepository::new();
        repo.expect_insert().times(0);

        let (service, _rx) = service(repo);

        for input in ["", "   ", "/foo", "ftp://x", "javascript:alert(1)"] {
            let result = service.create(input).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{input:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_create_retries_on_collision() {
        let mut generator = MockCodeGenerator::new();
        let mut gen_seq = Sequence::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut gen_seq)
            .returning(|| "taken1".to_string());
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut gen_seq)
            .returning(|| "fresh1".to_string());

        let mut repo = MockUrlRepository::new();
        let mut repo_seq = Sequence::new();
        repo.expect_insert()
            .withf(|new_record| new_record.short_code == "taken1")
            .times(1)
            .in_sequence(&mut repo_seq)
            .returning(|_| Err(AppError::duplicate_key("dup", json!({}))));
        repo.expect_insert()
            .withf(|new_record| new_record.short_code == "fresh1")
            .times(1)
            .in_sequence(&mut repo_seq)
            .returning(|new_record| Ok(UrlRecord::from_new(2, new_record)));

        let (service, _rx) = service(repo);
        let service = service.with_generator(Arc::new(generator));

        let created = service.create("https://example.com").await.unwrap();
        assert_eq!(created.short_code, "fresh1");
    }

    #[tokio::test]
    async fn test_create_exhausts_attempts() {
        let mut repo = MockUrlRepository::new();
        repo.expect_insert()
            .times(3)
            .returning(|_| Err(AppError::duplicate_key("dup", json!({}))));

        let (service, _rx) = service(repo);
        let service = service.with_max_attempts(3);

        let result = service.create("https://example.com").await;
        assert!(matches!(result, Err(AppError::CodeSpaceExhausted { .. })));
    }

    #[tokio::test]
    async fn test_create_does_not_retry_store_failures() {
        let mut repo = MockUrlRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("down", json!({}))));

        let (service, _rx) = service(repo);

        let result = service.create("https://example.com").await;
        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_resolve_enqueues_access_event() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .withf(|code| code == "Ab3xY9")
            .times(1)
            .returning(|code| Ok(Some(record(1, code, "https://example.com"))));
        repo.expect_increment_access_count().times(0);

        let (service, mut rx) = service(repo);

        let resolved = service.resolve("Ab3xY9").await.unwrap();
        assert_eq!(resolved.original_url, "https://example.com");
        assert_eq!(resolved.access_count, 0);

        let event = rx.try_recv().unwrap();
        assert_eq!(event.short_code, "Ab3xY9");
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|_| Ok(None));

        let (service, mut rx) = service(repo);

        let result = service.resolve("zzzzzz").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_malformed_code_is_not_found_without_store_call() {
        let repo = MockUrlRepository::new();
        let (service, _rx) = service(repo);

        assert!(matches!(
            service.resolve("bad-code!").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.stats("").await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete("toolongcode").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_queue_is_full() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .times(2)
            .returning(|code| Ok(Some(record(1, code, "https://example.com"))));

        let (tx, _rx) = mpsc::channel(1);
        let service = UrlService::new(Arc::new(repo), tx);

        assert!(service.resolve("abc123").await.is_ok());
        assert!(service.resolve("abc123").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_queue_is_closed() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code()
            .times(1)
            .returning(|code| Ok(Some(record(1, code, "https://example.com"))));

        let (service, rx) = service(repo);
        drop(rx);

        assert!(service.resolve("abc123").await.is_ok());
        assert!(!service.access_queue_open());
    }

    #[tokio::test]
    async fn test_stats_has_no_side_effect() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_code().times(1).returning(|code| {
            let mut found = record(1, code, "https://example.com");
            found.access_count = 5;
            Ok(Some(found))
        });

        let (service, mut rx) = service(repo);

        let stats = service.stats("abc123").await.unwrap();
        assert_eq!(stats.access_count, 5);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_success() {
        let mut repo = MockUrlRepository::new();
        repo.expect_update()
            .withf(|code, patch| code == "abc123" && patch.original_url == "https://rust-lang.org")
            .times(1)
            .returning(|code, patch| {
                let mut updated = record(1, code, "https://example.com");
                updated.apply(patch);
                Ok(updated)
            });

        let (service, _rx) = service(repo);

        let updated = service
            .update("abc123", "https://rust-lang.org")
            .await
            .unwrap();
        assert_eq!(updated.short_code, "abc123");
        assert_eq!(updated.original_url, "https://rust-lang.org");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn test_update_validates_before_store() {
        let mut repo = MockUrlRepository::new();
        repo.expect_update().times(0);

        let (service, _rx) = service(repo);

        let result = service.update("abc123", "ftp://x").await;
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let mut repo = MockUrlRepository::new();
        repo.expect_update()
            .times(1)
            .returning(|code, _| Err(not_found(code)));

        let (service, _rx) = service(repo);

        let result = service.update("abc123", "https://example.com").await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_success_and_not_found() {
        let mut repo = MockUrlRepository::new();
        let mut seq = Sequence::new();
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        repo.expect_delete()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|code| Err(not_found(code)));

        let (service, _rx) = service(repo);

        assert!(service.delete("abc123").await.is_ok());
        assert!(matches!(
            service.delete("abc123").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_store_call_times_out() {
        let (service, _rx) = service(MockUrlRepository::new());
        let service = service.with_store_timeout(Duration::from_millis(50));

        let result = service
            .bounded("find_by_code", async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, AppError>(())
            })
            .await;

        assert!(matches!(result, Err(AppError::StoreUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_check_store_propagates_ping_failure() {
        let mut repo = MockUrlRepository::new();
        repo.expect_ping()
            .times(1)
            .returning(|| Err(AppError::store_unavailable("down", json!({}))));

        let (service, _rx) = service(repo);

        assert!(service.check_store().await.is_err());
        assert!(service.access_queue_open());
        assert_eq!(service.access_queue_capacity(), 16);
    }
}
