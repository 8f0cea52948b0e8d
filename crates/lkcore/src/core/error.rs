use thiserror::Error;

use crate::storage::StorageError;

/// Centralized error type of the client core
///
/// Failures on the authorization path are logged and swallowed by the
/// orchestrator; this type surfaces only from the lower-level pieces
/// (webhook client, stores, markup reader) and from the CLI.
///
/// # Example
///
/// ```
/// use lkcore::AppError;
///
/// let err = AppError::Validation("missing phone_number".into());
/// assert_eq!(err.to_string(), "Validation error: missing phone_number");
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport-level HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the webhook
    #[error("HTTP request failed with status: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// URL parsing errors
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
