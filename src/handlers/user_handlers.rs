use crate::error::AppError;
use crate::handlers::{fail_errors, fail_message, ok_data, ok_message, ok_message_data, IdQuery};
use crate::services::user_service::UserServiceError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

const USER_NOT_FOUND: &str = "User tidak ditemukan!";

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let users = state.user_service.list_all().await?;
    Ok(ok_data(users))
}

/// GET /user/find?id=
///
/// An unknown id answers `data: null` rather than a failure message; this
/// lookup has always been null-encoding and callers rely on it.
pub async fn find_user(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let user = match query.parse() {
        Some(id) => state.user_service.find(id).await?,
        None => None,
    };
    Ok(ok_data(user))
}

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    pub nama: Option<String>,
}

/// GET /user/search?nama=
///
/// Matches name or email as a substring. A missing or empty `nama` matches
/// every user.
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Value>, AppError> {
    let users = state
        .user_service
        .search(query.nama.as_deref().unwrap_or(""))
        .await?;
    Ok(ok_data(users))
}

/// POST /register
pub async fn register_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let body = body.as_object().cloned().unwrap_or_default();
    match state.user_service.register(&body).await {
        Ok(user) => Ok(ok_data(user)),
        Err(UserServiceError::Validation(errors)) => Ok(fail_errors(errors)),
        Err(e) => Err(e.into()),
    }
}

/// PUT /user/edit/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let body = body.as_object().cloned().unwrap_or_default();
    match state.user_service.update(id, &body).await {
        Ok(user) => Ok(ok_message_data("Sukses diubah!", user)),
        Err(UserServiceError::Validation(errors)) => Ok(fail_errors(errors)),
        Err(UserServiceError::UserNotFound) => Ok(fail_message(USER_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /user/delete?id=
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let Some(id) = query.parse() else {
        return Ok(fail_message(USER_NOT_FOUND));
    };

    match state.user_service.delete(id).await {
        Ok(()) => Ok(ok_message("User berhasil dihapus!")),
        Err(UserServiceError::UserNotFound) => Ok(fail_message(USER_NOT_FOUND)),
        Err(UserServiceError::UserInUse) => Ok(fail_message("User masih memiliki product!")),
        Err(e) => Err(e.into()),
    }
}
