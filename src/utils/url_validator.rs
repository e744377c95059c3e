//! Validation of destination URLs.
//!
//! A destination must be non-empty, parse as an absolute URL with a host, and
//! use the `http` or `https` scheme (compared case-insensitively).

use url::Url;

/// Reasons a destination URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("URL cannot be empty")]
    EmptyInput,

    #[error("Invalid URL format or URL must be absolute: {0}")]
    MalformedUrl(String),

    #[error("URL must use HTTP or HTTPS protocol, got '{0}'")]
    UnsupportedScheme(String),
}

impl UrlValidationError {
    /// Stable identifier used in API error details.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::MalformedUrl(_) => "malformed_url",
            Self::UnsupportedScheme(_) => "unsupported_scheme",
        }
    }
}

/// Checks that `input` is an acceptable destination URL.
///
/// # Errors
///
/// - [`UrlValidationError::EmptyInput`] if `input` is blank
/// - [`UrlValidationError::MalformedUrl`] if it is relative, unparsable or has no host
/// - [`UrlValidationError::UnsupportedScheme`] for any scheme other than HTTP(S)
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com").is_ok());
/// assert!(validate_url("/foo").is_err());
/// assert!(validate_url("ftp://x").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlValidationError::EmptyInput);
    }

    let url = Url::parse(trimmed).map_err(|e| UrlValidationError::MalformedUrl(e.to_string()))?;

    // `Url` lowercases the scheme while parsing.
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MalformedUrl("missing host".to_string())),
    }
}
