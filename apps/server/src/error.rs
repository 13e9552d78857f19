use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use isuride_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

/// Handlers are thin over the services, so every failure is a core error.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        e if e.is_retryable() => StatusCode::SERVICE_UNAVAILABLE,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
        CoreError::Database(DatabaseError::UniqueViolation(_)) => StatusCode::CONFLICT,
        CoreError::Database(DatabaseError::ForeignKeyViolation(_)) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::Core(e) => (core_status(e), e.to_string()),
        };
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {}", status, msg);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: msg,
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
