use crate::{handlers, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// The full route table.
///
/// | Method | Path               | Handler                    |
/// |--------|--------------------|----------------------------|
/// | GET    | /products/semuanya | `list_products`            |
/// | GET    | /products/search   | `search_products` (`teks`) |
/// | POST   | /products          | `create_product`           |
/// | GET    | /products/find     | `find_product` (`id`)      |
/// | PUT    | /products/update   | `update_product` (`id`)    |
/// | DELETE | /products/delete   | `delete_product` (`id`)    |
/// | GET    | /users             | `list_users`               |
/// | GET    | /user/find         | `find_user` (`id`)         |
/// | GET    | /user/search       | `search_users` (`nama`)    |
/// | POST   | /register          | `register_user`            |
/// | PUT    | /user/edit/{id}    | `update_user`              |
/// | DELETE | /user/delete       | `delete_user` (`id`)       |
///
/// API contract: every response is a `{status, message?, data?, errors?}`
/// envelope. Validation failures and unknown ids answer HTTP 200 with
/// `status: "Gagal"`; only server-side faults produce a 5xx.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Product routes
        .route("/products/semuanya", get(handlers::list_products))
        .route("/products/search", get(handlers::search_products))
        .route("/products", post(handlers::create_product))
        .route("/products/find", get(handlers::find_product))
        .route("/products/update", put(handlers::update_product))
        .route("/products/delete", delete(handlers::delete_product))
        // User routes
        .route("/users", get(handlers::list_users))
        .route("/user/find", get(handlers::find_user))
        .route("/user/search", get(handlers::search_users))
        .route("/register", post(handlers::register_user))
        .route("/user/edit/{id}", put(handlers::update_user))
        .route("/user/delete", delete(handlers::delete_user))
        // Layers
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
