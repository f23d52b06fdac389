use crate::models::product::{NewProduct, ProductChanges, ProductWithOwner};
use crate::repositories::product_repository::ProductRepository;
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::validation::{
    as_boolean, as_integer, as_number, as_text, strip_nulls, validate, Field, Rule,
    ValidationErrors,
};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Product not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    users: Arc<dyn UserRepository>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { products, users }
    }

    pub async fn list_available(&self) -> Result<Vec<ProductWithOwner>, ProductServiceError> {
        Ok(self.products.list_available().await?)
    }

    /// Search products by name. The needle must be at least three characters
    /// long; shorter input fails validation before touching the database.
    pub async fn search(
        &self,
        text: Option<&str>,
    ) -> Result<Vec<ProductWithOwner>, ProductServiceError> {
        let mut body = Map::new();
        if let Some(text) = text {
            body.insert("teks".to_string(), Value::String(text.to_string()));
        }

        let rules = [Field::new("teks")
            .label("Huruf")
            .rule_with(Rule::Required, "Attribute jangan di kosongkah lah Bos!")
            .rule_with(Rule::MinLen(3), "Ini kurang dari 3 Bos!")];

        validate(&body, &rules).map_err(ProductServiceError::Validation)?;

        let needle = body
            .get("teks")
            .and_then(as_text)
            .unwrap_or_default();
        Ok(self.products.search(&needle).await?)
    }

    pub async fn create(
        &self,
        body: &Map<String, Value>,
    ) -> Result<ProductWithOwner, ProductServiceError> {
        let body = strip_nulls(body);

        let rules = [
            Field::new("user_id")
                .rule_with(Rule::Required, "User ID wajib diisi!")
                .rule(Rule::Integer { min: None }),
            Field::new("name")
                .rule_with(Rule::Required, "Nama product wajib diisi!")
                .rule(Rule::MaxLen(255)),
            Field::new("price")
                .label("Harga")
                .rule_with(Rule::Required, "Harga product wajib diisi!")
                .rule_with(Rule::Numeric { min: None }, "Harga harus berupa angka!")
                .rule(Rule::Numeric { min: Some(0.0) }),
            Field::new("stock")
                .label("Stok")
                .rule_with(Rule::Required, "Stok product wajib diisi!")
                .rule_with(Rule::Integer { min: None }, "Stok harus berupa angka bulat!")
                .rule(Rule::Integer { min: Some(0) }),
            Field::new("image_path").rule(Rule::MaxLen(255)),
            Field::new("is_available").rule(Rule::Boolean),
        ];

        let mut errors = match validate(&body, &rules) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        // Foreign key check: the owner must exist before the insert.
        let owner_id = body.get("user_id").and_then(as_integer);
        if !errors.0.contains_key("user_id") {
            if let Some(owner_id) = owner_id {
                if self.users.find_by_id(owner_id).await?.is_none() {
                    errors.add("user_id", "User tidak ditemukan!");
                }
            }
        }

        if !errors.is_empty() {
            return Err(ProductServiceError::Validation(errors));
        }

        let product = NewProduct {
            user_id: owner_id.unwrap_or_default(),
            name: body.get("name").and_then(as_text).unwrap_or_default(),
            description: body.get("description").and_then(as_text),
            price: body.get("price").and_then(as_number).unwrap_or_default(),
            stock: body.get("stock").and_then(as_integer).unwrap_or_default(),
            image_path: body.get("image_path").and_then(as_text),
            is_available: body
                .get("is_available")
                .and_then(as_boolean)
                .unwrap_or(true),
        };

        match self.products.create(product).await {
            Ok(created) => Ok(created),
            // Backstop for the owner being deleted between the check above
            // and the insert.
            Err(RepositoryError::ForeignKey) => {
                let mut errors = ValidationErrors::new();
                errors.add("user_id", "User tidak ditemukan!");
                Err(ProductServiceError::Validation(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: i64) -> Result<ProductWithOwner, ProductServiceError> {
        self.products
            .find_with_owner(id)
            .await?
            .ok_or(ProductServiceError::NotFound)
    }

    /// Partial update. Null fields were already stripped, so a null never
    /// overwrites a stored value; an empty body is a no-op returning the
    /// unchanged record.
    pub async fn update(
        &self,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<ProductWithOwner, ProductServiceError> {
        if self.products.find_by_id(id).await?.is_none() {
            return Err(ProductServiceError::NotFound);
        }

        let body = strip_nulls(body);

        let rules = [
            Field::new("name").rule(Rule::MaxLen(255)),
            Field::new("price")
                .label("Harga")
                .rule_with(Rule::Numeric { min: None }, "Harga harus berupa angka!")
                .rule(Rule::Numeric { min: Some(0.0) }),
            Field::new("stock")
                .label("Stok")
                .rule_with(Rule::Integer { min: None }, "Stok harus berupa angka bulat!")
                .rule(Rule::Integer { min: Some(0) }),
            Field::new("image_path").rule(Rule::MaxLen(255)),
            Field::new("is_available").rule(Rule::Boolean),
        ];

        validate(&body, &rules).map_err(ProductServiceError::Validation)?;

        let changes = ProductChanges {
            name: body.get("name").and_then(as_text),
            description: body.get("description").and_then(as_text),
            price: body.get("price").and_then(as_number),
            stock: body.get("stock").and_then(as_integer),
            image_path: body.get("image_path").and_then(as_text),
            is_available: body.get("is_available").and_then(as_boolean),
        };

        if !changes.is_empty() {
            match self.products.update(id, changes).await {
                Ok(()) => {}
                Err(RepositoryError::NotFound) => return Err(ProductServiceError::NotFound),
                Err(e) => return Err(e.into()),
            }
        }

        self.products
            .find_with_owner(id)
            .await?
            .ok_or(ProductServiceError::NotFound)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ProductServiceError> {
        match self.products.delete(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(ProductServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::Product;
    use crate::models::user::{User, UserView};
    use crate::repositories::product_repository::MockProductRepository;
    use crate::repositories::user_repository::MockUserRepository;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn owner() -> User {
        User {
            id: 1,
            name: "Ahmad".to_string(),
            email: "a@x.com".to_string(),
            password: "$argon2id$stub".to_string(),
            phone: "08123".to_string(),
        }
    }

    fn kopi() -> ProductWithOwner {
        ProductWithOwner {
            product: Product {
                id: 10,
                user_id: 1,
                name: "Kopi Susu".to_string(),
                description: None,
                price: 15000.0,
                stock: 3,
                image_path: None,
                is_available: true,
            },
            user: UserView {
                id: 1,
                name: "Ahmad".to_string(),
                email: "a@x.com".to_string(),
                phone: "08123".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn create_fails_when_owner_does_not_exist() {
        let products = MockProductRepository::new();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = ProductService::new(Arc::new(products), Arc::new(users));
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
    async fn create_collects_field_errors() {
        let products = MockProductRepository::new();
        let users = MockUserRepository::new();

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        let result = service
            .create(&body(json!({"price": "mahal", "stock": -1})))
            .await;

        match result {
            Err(ProductServiceError::Validation(errors)) => {
                assert_eq!(errors.0["user_id"], "User ID wajib diisi!");
                assert_eq!(errors.0["name"], "Nama product wajib diisi!");
                assert_eq!(errors.0["price"], "Harga harus berupa angka!");
                assert_eq!(errors.0["stock"], "Stok minimal 0!");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[tokio::test]
    async fn search_requires_three_characters() {
        let products = MockProductRepository::new();
        let users = MockUserRepository::new();
        let service = ProductService::new(Arc::new(products), Arc::new(users));

        match service.search(Some("ab")).await {
            Err(ProductServiceError::Validation(errors)) => {
                assert_eq!(errors.0["teks"], "Ini kurang dari 3 Bos!");
            }
            _ => panic!("expected validation error"),
        }

        match service.search(None).await {
            Err(ProductServiceError::Validation(errors)) => {
                assert_eq!(errors.0["teks"], "Attribute jangan di kosongkah lah Bos!");
            }
            _ => panic!("expected validation error"),
        }
    }

    #[tokio::test]
    async fn search_boundary_length_hits_repository() {
        let mut products = MockProductRepository::new();
        products
            .expect_search()
            .withf(|text| text == "kop")
            .times(1)
            .returning(|_| Box::pin(async { Ok(vec![]) }));
        let users = MockUserRepository::new();

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        let result = service.search(Some("kop")).await;
        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_with_empty_body_returns_unchanged_record() {
        let mut products = MockProductRepository::new();
        products
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(Some(kopi().product)) }));
        // No update call expected for an empty patch.
        products.expect_update().times(0);
        products
            .expect_find_with_owner()
            .returning(|_| Box::pin(async { Ok(Some(kopi())) }));
        let users = MockUserRepository::new();

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        let result = service.update(10, &body(json!({}))).await.unwrap();
        assert_eq!(result.product.name, "Kopi Susu");
        assert_eq!(result.product.stock, 3);
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let mut products = MockProductRepository::new();
        products.expect_delete().returning(|_| {
            Box::pin(async { Err(crate::repositories::RepositoryError::NotFound) })
        });
        let users = MockUserRepository::new();

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        assert!(matches!(
            service.delete(999).await,
            Err(ProductServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn create_maps_foreign_key_race_to_validation_error() {
        let mut products = MockProductRepository::new();
        products.expect_create().returning(|_| {
            Box::pin(async { Err(crate::repositories::RepositoryError::ForeignKey) })
        });
        // Owner exists at check time but vanishes before the insert.
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(Some(owner())) }));

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        let result = service
            .create(&body(json!({
                "user_id": 1,
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
    async fn create_defaults_availability_to_true() {
        let mut products = MockProductRepository::new();
        products
            .expect_create()
            .withf(|p: &NewProduct| p.is_available && p.user_id == 1)
            .times(1)
            .returning(|_| Box::pin(async { Ok(kopi()) }));
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(Some(owner())) }));

        let service = ProductService::new(Arc::new(products), Arc::new(users));
        let result = service
            .create(&body(json!({
                "user_id": 1,
                "name": "Kopi Susu",
                "price": 15000,
                "stock": 3
            })))
            .await;
        assert!(result.is_ok());
    }
}
