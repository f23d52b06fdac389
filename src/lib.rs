pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod validation;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<services::user_service::UserService>,
    pub product_service: Arc<services::product_service::ProductService>,
    pub pool: sqlx::SqlitePool,
}
