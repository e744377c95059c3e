//! Request body shared by the create and update endpoints.

use serde::Deserialize;
use validator::Validate;

/// Upper bound on accepted destination length.
pub const MAX_URL_LENGTH: u64 = 2048;

/// Body of `POST /shorten` and `PUT /shorten/{code}`.
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// Only the length is checked here; scheme and shape are validated by the
/// service so that both the API and the admin CLI apply the same rules.
#[derive(Debug, Deserialize, Validate)]
pub struct UrlRequest {
    #[validate(length(max = 2048, message = "URL must be at most 2048 characters"))]
    pub url: String,
}
