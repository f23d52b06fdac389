use crate::error::AppError;
use crate::handlers::{fail_errors, fail_message, ok_data, ok_message, ok_message_data, IdQuery};
use crate::services::product_service::ProductServiceError;
use crate::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::Value;

const PRODUCT_NOT_FOUND: &str = "Product tidak ditemukan!";

/// GET /products/semuanya
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let products = state.product_service.list_available().await?;
    Ok(ok_data(products))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub teks: Option<String>,
}

/// GET /products/search?teks=
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, AppError> {
    match state.product_service.search(query.teks.as_deref()).await {
        Ok(products) => Ok(ok_data(products)),
        Err(ProductServiceError::Validation(errors)) => Ok(fail_errors(errors)),
        Err(e) => Err(e.into()),
    }
}

/// POST /products
pub async fn create_product(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let body = body.as_object().cloned().unwrap_or_default();
    match state.product_service.create(&body).await {
        Ok(product) => Ok(ok_message_data("Product berhasil ditambahkan!", product)),
        Err(ProductServiceError::Validation(errors)) => Ok(fail_errors(errors)),
        Err(ProductServiceError::NotFound) => Ok(fail_message(PRODUCT_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

/// GET /products/find?id=
pub async fn find_product(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let Some(id) = query.parse() else {
        return Ok(fail_message(PRODUCT_NOT_FOUND));
    };

    match state.product_service.get(id).await {
        Ok(product) => Ok(ok_data(product)),
        Err(ProductServiceError::NotFound) => Ok(fail_message(PRODUCT_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

/// PUT /products/update?id=
pub async fn update_product(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let Some(id) = query.parse() else {
        return Ok(fail_message(PRODUCT_NOT_FOUND));
    };

    let body = body.as_object().cloned().unwrap_or_default();
    match state.product_service.update(id, &body).await {
        Ok(product) => Ok(ok_message_data("Product berhasil diupdate!", product)),
        Err(ProductServiceError::Validation(errors)) => Ok(fail_errors(errors)),
        Err(ProductServiceError::NotFound) => Ok(fail_message(PRODUCT_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /products/delete?id=
pub async fn delete_product(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, AppError> {
    let Some(id) = query.parse() else {
        return Ok(fail_message(PRODUCT_NOT_FOUND));
    };

    match state.product_service.delete(id).await {
        Ok(()) => Ok(ok_message("Product berhasil dihapus!")),
        Err(ProductServiceError::NotFound) => Ok(fail_message(PRODUCT_NOT_FOUND)),
        Err(e) => Err(e.into()),
    }
}
