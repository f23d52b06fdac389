pub mod product_handlers;
pub mod user_handlers;

use crate::validation::ValidationErrors;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use product_handlers::{
    create_product, delete_product, find_product, list_products, search_products, update_product,
};
pub use user_handlers::{delete_user, find_user, list_users, register_user, search_users, update_user};

/// Unified response envelope shared by every route.
///
/// Failures caused by the caller (validation, unknown ids) are still HTTP
/// 200 with `status: "Gagal"`; callers depend on the always-200 behavior.
/// Only unexpected faults (see [`crate::error::AppError`]) get a 5xx.
pub fn ok_data<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "status": "Sukses", "data": data }))
}

pub fn ok_message_data<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "status": "Sukses", "message": message, "data": data }))
}

pub fn ok_message(message: &str) -> Json<Value> {
    Json(json!({ "status": "Sukses", "message": message }))
}

pub fn fail_message(message: &str) -> Json<Value> {
    Json(json!({ "status": "Gagal", "message": message }))
}

pub fn fail_errors(errors: ValidationErrors) -> Json<Value> {
    Json(json!({ "status": "Gagal", "errors": errors }))
}

/// `?id=` query parameter. Kept as a raw string so a missing or garbled id
/// takes the not-found path instead of a framework-level 400.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn parse(&self) -> Option<i64> {
        self.id.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}
