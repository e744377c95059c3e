//! Handlers for resolving, updating and deleting a short code.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::shorten::UrlRequest;
use crate::api::dto::url_record::UrlRecordResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the record behind a short code and counts the access.
///
/// # Endpoint
///
/// `GET /shorten/{code}`
///
/// # Access Counting
///
/// The increment is queued for the background worker and not awaited, so the
/// returned `access_count` does not include this request.
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn resolve_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UrlRecordResponse>, AppError> {
    let record = state.url_service.resolve(&code).await?;
    Ok(Json(record.into()))
}

/// Points a short code at a new destination.
///
/// # Endpoint
///
/// `PUT /shorten/{code}`
///
/// # Request Body
///
/// ```json
/// { "url": "https://new-destination.com" }
/// ```
///
/// `short_code`, `id`, `created_at` and `access_count` are preserved.
///
/// # Errors
///
/// Returns 400 Bad Request if the body or URL is invalid.
/// Returns 404 Not Found if the short code doesn't exist.
pub async fn update_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<UrlRecordResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let record = state.url_service.update(&code, &payload.url).await?;
    Ok(Json(record.into()))
}

/// Permanently removes a short code.
///
/// # Endpoint
///
/// `DELETE /shorten/{code}`
///
/// # Errors
///
/// Returns 404 Not Found if the short code doesn't exist, including when it
/// was already deleted.
pub async fn delete_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.url_service.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
