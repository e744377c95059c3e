//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::UrlService;
use crate::domain::repositories::UrlRepository;

/// State shared by all handlers.
///
/// The service is type-erased over its store so the same router serves
/// PostgreSQL in production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub url_service: Arc<UrlService<dyn UrlRepository>>,
}

impl AppState {
    pub fn new(url_service: Arc<UrlService<dyn UrlRepository>>) -> Self {
        Self { url_service }
    }
}
