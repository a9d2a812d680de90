pub mod ai;
pub mod health;
pub mod menu;
pub mod root;

use axum::extract::{rejection::JsonRejection, Json};
use axum::http::StatusCode;
use service_core::error::{AppError, Rejection};

pub use health::{health_check, metrics_handler, readiness_check};

/// Unwrap a JSON body, reporting malformed input with the standard error envelope.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Invalid JSON body: {}", e.body_text()))
    })
}

/// Report a storage or internal failure under the operation's own message.
/// Other errors pass through untouched.
pub(crate) fn failed(message: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| match err {
        AppError::DatabaseError(e) | AppError::InternalError(e) => {
            tracing::error!(error = %e, "{}", message);
            Rejection::new(StatusCode::INTERNAL_SERVER_ERROR, message)
                .with("error", e.to_string())
                .into()
        }
        other => other,
    }
}
