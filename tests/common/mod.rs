#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use shortcode_service::api::handlers::health_handler;
use shortcode_service::api::routes::shorten_routes;
use shortcode_service::application::services::UrlService;
use shortcode_service::domain::access_worker::run_access_worker;
use shortcode_service::domain::repositories::UrlRepository;
use shortcode_service::infrastructure::persistence::InMemoryUrlRepository;
use shortcode_service::state::AppState;
use shortcode_service::utils::code_generator::SeededCodeGenerator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// State over an in-memory store with a running access worker.
pub fn create_test_state() -> (AppState, Arc<InMemoryUrlRepository>) {
    let repository = Arc::new(InMemoryUrlRepository::new());
    let (tx, rx) = mpsc::channel(100);

    let store: Arc<dyn UrlRepository> = repository.clone();
    tokio::spawn(run_access_worker(rx, store.clone(), 4));

    let service = UrlService::new(store, tx);
    (AppState::new(Arc::new(service)), repository)
}

/// State whose access queue receiver is returned instead of consumed.
pub fn create_state_without_worker() -> (
    AppState,
    mpsc::Receiver<shortcode_service::domain::access_event::AccessEvent>,
) {
    let store: Arc<dyn UrlRepository> = Arc::new(InMemoryUrlRepository::new());
    let (tx, rx) = mpsc::channel(100);

    let service = UrlService::new(store, tx)
        .with_generator(Arc::new(SeededCodeGenerator::new(42)));
    (AppState::new(Arc::new(service)), rx)
}

pub fn test_router(state: AppState) -> Router {
    Router::new()
        .merge(shorten_routes())
        .route("/health", get(health_handler))
        .with_state(state)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(test_router(state)).unwrap()
}

/// Creates a short URL through the API and returns its code.
pub async fn create_short_url(server: &TestServer, url: &str) -> String {
    let response = server
        .post("/shorten")
        .json(&serde_json::json!({ "url": url }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    response.json::<serde_json::Value>()["short_code"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Polls the stats endpoint until `access_count` reaches `expected`.
pub async fn wait_for_access_count(server: &TestServer, code: &str, expected: i64) -> i64 {
    let mut last = -1;
    for _ in 0..100 {
        let json = server
            .get(&format!("/shorten/{code}/stats"))
            .await
            .json::<serde_json::Value>();
        last = json["access_count"].as_i64().unwrap();
        if last == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    last
}
