//! Background worker applying access-count increments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info};

use crate::domain::access_event::AccessEvent;
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

/// Consumes access events until the channel closes.
///
/// Up to `concurrency` increments are in flight at once. Transient store
/// failures are retried with jittered exponential backoff; a record deleted
/// before its increment lands is skipped. Failures are logged and counted,
/// never propagated to the request that produced the event.
///
/// Returns once every queued event has been applied or abandoned, so awaiting
/// the worker's handle after the senders are dropped flushes pending counts.
pub async fn run_access_worker<R>(
    mut rx: mpsc::Receiver<AccessEvent>,
    repository: Arc<R>,
    concurrency: usize,
) where
    R: UrlRepository + ?Sized + 'static,
{
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            apply_increment(repository.as_ref(), &event).await;
            drop(permit);
        });
    }

    // Wait for in-flight increments before reporting the worker as stopped.
    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Access worker stopped");
}

async fn apply_increment<R>(repository: &R, event: &AccessEvent)
where
    R: UrlRepository + ?Sized,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(
        strategy,
        || repository.increment_access_count(&event.short_code),
        AppError::is_transient,
    )
    .await;

    match result {
        Ok(()) => debug!(short_code = %event.short_code, "Access counted"),
        Err(AppError::NotFound { .. }) => {
            debug!(short_code = %event.short_code, "Record removed before access was counted");
        }
        Err(e) => {
            metrics::counter!("access_increments_failed_total").increment(1);
            error!(
                short_code = %event.short_code,
                accessed_at = %event.accessed_at,
                error = %e,
                "Failed to increment access count"
            );
        }
    }
}
