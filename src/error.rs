use crate::repositories::user_repository::RepositoryError;
use crate::services::product_service::ProductServiceError;
use crate::services::user_service::UserServiceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Unexpected faults that escape the handler layer. Caller mistakes
/// (validation, unknown ids) never become an `AppError`; handlers turn those
/// into `status: "Gagal"` envelopes with HTTP 200. Database errors arrive
/// already wrapped in [`RepositoryError`] by the repositories.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Repository(e) => AppError::Repository(e),
            UserServiceError::Hashing(msg) => AppError::Hashing(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ProductServiceError> for AppError {
    fn from(err: ProductServiceError) -> Self {
        match err {
            ProductServiceError::Repository(e) => AppError::Repository(e),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {}", self);

        let body = json!({
            "status": "Gagal",
            "message": "Terjadi kesalahan pada server",
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
