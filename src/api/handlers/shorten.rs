//! Handler for link shortening endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::UrlRequest;
use crate::api::dto::url_record::UrlRecordResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short code for a long URL.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// 201 Created with the new record (`access_count` is 0).
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL is rejected.
/// Returns 500 if no unique code could be allocated or the store fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UrlRecordResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let record = state.url_service.create(&payload.url).await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}
