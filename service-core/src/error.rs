use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    /// A request refused by a business rule, rendered with a reason and hint.
    #[error("Rejected: {}", .0.message)]
    Rejected(Box<Rejection>),

    #[error("Too many requests: {0}")]
    TooManyRequests(String, Option<u64>),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

/// Structured refusal carried by [`AppError::Rejected`].
///
/// Serializes flat into the error envelope, so `extra` keys appear next to
/// `message`, `reason` and `hint`.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub status: StatusCode,
    pub message: String,
    pub reason: Option<String>,
    pub hint: Option<String>,
    pub extra: Map<String, Value>,
}

impl Rejection {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            reason: None,
            hint: None,
            extra: Map::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::Rejected(Box::new(rejection))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl ErrorResponse {
    fn new(message: String, error: Option<String>) -> Self {
        Self {
            success: false,
            message,
            reason: None,
            hint: None,
            error,
            extra: Map::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body, retry_after) = match self {
            AppError::ValidationError(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("Validation error".to_string(), Some(err.to_string())),
                None,
            ),
            AppError::BadRequest(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(err.to_string(), None),
                None,
            ),
            AppError::NotFound(err) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new(err.to_string(), None),
                None,
            ),
            AppError::Rejected(rejection) => {
                let Rejection {
                    status,
                    message,
                    reason,
                    hint,
                    extra,
                } = *rejection;
                (
                    status,
                    ErrorResponse {
                        success: false,
                        message,
                        reason,
                        hint,
                        error: None,
                        extra,
                    },
                    None,
                )
            }
            AppError::TooManyRequests(msg, retry) => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorResponse::new(msg, None),
                retry,
            ),
            AppError::InternalError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Internal server error".to_string(), Some(err.to_string())),
                None,
            ),
            AppError::DatabaseError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Database error".to_string(), Some(err.to_string())),
                None,
            ),
            AppError::ConfigError(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("Configuration error".to_string(), Some(err.to_string())),
                None,
            ),
        };

        let mut res = (status, Json(body)).into_response();

        if let Some(retry) = retry_after {
            res.headers_mut()
                .insert(axum::http::header::RETRY_AFTER, retry.into());
        }

        res
    }
}
