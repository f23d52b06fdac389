use serde_json::{json, Map, Value};
use std::sync::Arc;
use warung::{
    repositories::{
        product_repository::SqliteProductRepository, user_repository::SqliteUserRepository,
    },
    services::product_service::{ProductService, ProductServiceError},
    test_utils::test_helpers,
};

fn body(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn service(pool: sqlx::SqlitePool) -> ProductService {
    ProductService::new(
        Arc::new(SqliteProductRepository::new(pool.clone())),
        Arc::new(SqliteUserRepository::new(pool)),
    )
}

async fn seeded_owner(pool: &sqlx::SqlitePool) -> i64 {
    test_helpers::insert_test_user(pool, "Ahmad", "a@x.com", "secret1", "08123")
        .await
        .unwrap()
}

#[tokio::test]
async fn create_then_get_round_trips_with_owner() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    let service = service(pool);

    let created = service
        .create(&body(json!({
            "user_id": owner,
            "name": "Kopi Susu",
            "description": "Gula aren",
            "price": 15000.5,
            "stock": 3,
            "image_path": "img/kopi.jpg"
        })))
        .await
        .unwrap();

    let fetched = service.get(created.product.id).await.unwrap();
    assert_eq!(fetched.product.name, "Kopi Susu");
    assert_eq!(fetched.product.description.as_deref(), Some("Gula aren"));
    assert_eq!(fetched.product.price, 15000.5);
    assert_eq!(fetched.product.stock, 3);
    assert_eq!(fetched.product.image_path.as_deref(), Some("img/kopi.jpg"));
    assert!(fetched.product.is_available);
    assert_eq!(fetched.user.id, owner);
    assert_eq!(fetched.user.name, "Ahmad");
}

#[tokio::test]
async fn create_with_unknown_owner_fails() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service(pool);

    let result = service
        .create(&body(json!({
            "user_id": 999,
            "name": "Kopi Susu",
            "price": 15000,
            "stock": 3
        })))
        .await;

    match result {
        Err(ProductServiceError::Validation(errors)) => {
            assert_eq!(errors.0["user_id"], "User tidak ditemukan!");
        }
        _ => panic!("expected validation error"),
    }
}

#[tokio::test]
async fn search_is_case_insensitive_and_has_length_boundary() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    let service = service(pool);

    // Two characters: rejected before the query runs.
    assert!(matches!(
        service.search(Some("ko")).await,
        Err(ProductServiceError::Validation(_))
    ));

    // Exactly three characters: accepted.
    let found = service.search(Some("KOP")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].product.name, "Kopi Susu");
    assert_eq!(found[0].user.name, "Ahmad");

    // No match is still a success.
    let empty = service.search(Some("teh manis")).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn list_available_filters_unavailable_products() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    test_helpers::insert_test_product(&pool, owner, "Teh Tarik", 10000.0, 5, false)
        .await
        .unwrap();
    let service = service(pool);

    let listed = service.list_available().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].product.name, "Kopi Susu");
}

#[tokio::test]
async fn update_with_empty_body_is_idempotent() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    let id = test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    let service = service(pool);

    let unchanged = service.update(id, &body(json!({}))).await.unwrap();
    assert_eq!(unchanged.product.name, "Kopi Susu");
    assert_eq!(unchanged.product.price, 15000.0);
    assert_eq!(unchanged.product.stock, 3);
}

#[tokio::test]
async fn update_nulls_never_overwrite_values() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    let id = test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    let service = service(pool);

    let updated = service
        .update(id, &body(json!({"name": null, "price": null, "stock": 7})))
        .await
        .unwrap();

    assert_eq!(updated.product.name, "Kopi Susu");
    assert_eq!(updated.product.price, 15000.0);
    assert_eq!(updated.product.stock, 7);
}

#[tokio::test]
async fn update_rejects_negative_price() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    let id = test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    let service = service(pool);

    let result = service.update(id, &body(json!({"price": -5}))).await;
    match result {
        Err(ProductServiceError::Validation(errors)) => {
            assert_eq!(errors.0["price"], "Harga minimal 0!");
        }
        _ => panic!("expected validation error"),
    }
}

#[tokio::test]
async fn update_missing_product_is_not_found() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = service(pool);

    assert!(matches!(
        service.update(999, &body(json!({"name": "Teh"}))).await,
        Err(ProductServiceError::NotFound)
    ));
}

#[tokio::test]
async fn repository_insert_with_unknown_owner_is_foreign_key_error() {
    use warung::models::product::NewProduct;
    use warung::repositories::product_repository::ProductRepository;
    use warung::repositories::RepositoryError;

    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = SqliteProductRepository::new(pool);

    // Bypass the service pre-check: the datastore itself must refuse the row.
    let result = repository
        .create(NewProduct {
            user_id: 999,
            name: "Kopi Susu".to_string(),
            description: None,
            price: 15000.0,
            stock: 3,
            image_path: None,
            is_available: true,
        })
        .await;

    assert!(matches!(result, Err(RepositoryError::ForeignKey)));
}

#[tokio::test]
async fn delete_removes_the_row() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let owner = seeded_owner(&pool).await;
    let id = test_helpers::insert_test_product(&pool, owner, "Kopi Susu", 15000.0, 3, true)
        .await
        .unwrap();
    let service = service(pool);

    service.delete(id).await.unwrap();
    assert!(matches!(
        service.get(id).await,
        Err(ProductServiceError::NotFound)
    ));
    assert!(matches!(
        service.delete(id).await,
        Err(ProductServiceError::NotFound)
    ));
}
