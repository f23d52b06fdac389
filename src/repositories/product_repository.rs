use crate::models::product::{NewProduct, Product, ProductChanges, ProductWithOwner};
use crate::models::user::UserView;
use crate::repositories::user_repository::{map_constraint, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProductRepository: Send + Sync {
    async fn list_available(&self) -> RepositoryResult<Vec<ProductWithOwner>>;
    /// Case-insensitive substring match on product name, owner joined.
    async fn search(&self, text: &str) -> RepositoryResult<Vec<ProductWithOwner>>;
    async fn create(&self, product: NewProduct) -> RepositoryResult<ProductWithOwner>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>>;
    async fn find_with_owner(&self, id: i64) -> RepositoryResult<Option<ProductWithOwner>>;
    async fn update(&self, id: i64, changes: ProductChanges) -> RepositoryResult<()>;
    async fn delete(&self, id: i64) -> RepositoryResult<()>;
}

pub struct SqliteProductRepository {
    pool: SqlitePool,
}

impl SqliteProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Flat row for the product/owner join.
#[derive(FromRow)]
struct ProductOwnerRow {
    id: i64,
    user_id: i64,
    name: String,
    description: Option<String>,
    price: f64,
    stock: i64,
    image_path: Option<String>,
    is_available: bool,
    owner_name: String,
    owner_email: String,
    owner_phone: String,
}

impl From<ProductOwnerRow> for ProductWithOwner {
    fn from(row: ProductOwnerRow) -> Self {
        Self {
            user: UserView {
                id: row.user_id,
                name: row.owner_name,
                email: row.owner_email,
                phone: row.owner_phone,
            },
            product: Product {
                id: row.id,
                user_id: row.user_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                image_path: row.image_path,
                is_available: row.is_available,
            },
        }
    }
}

const JOIN_SELECT: &str = r#"
SELECT
    p.id, p.user_id, p.name, p.description, p.price, p.stock,
    p.image_path, p.is_available,
    u.name AS owner_name, u.email AS owner_email, u.phone AS owner_phone
FROM products p
JOIN users u ON u.id = p.user_id
"#;

#[async_trait]
impl ProductRepository for SqliteProductRepository {
    async fn list_available(&self) -> RepositoryResult<Vec<ProductWithOwner>> {
        let rows = sqlx::query_as::<_, ProductOwnerRow>(&format!(
            "{} WHERE p.is_available = 1 ORDER BY p.id",
            JOIN_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search(&self, text: &str) -> RepositoryResult<Vec<ProductWithOwner>> {
        let rows = sqlx::query_as::<_, ProductOwnerRow>(&format!(
            "{} WHERE p.name LIKE '%' || ? || '%' ORDER BY p.id",
            JOIN_SELECT
        ))
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, product: NewProduct) -> RepositoryResult<ProductWithOwner> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (user_id, name, description, price, stock, image_path, is_available)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product.user_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.image_path)
        .bind(product.is_available)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;

        let id = result.last_insert_rowid();
        self.find_with_owner(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, user_id, name, description, price, stock, image_path, is_available
            FROM products WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_with_owner(&self, id: i64) -> RepositoryResult<Option<ProductWithOwner>> {
        let row = sqlx::query_as::<_, ProductOwnerRow>(&format!("{} WHERE p.id = ?", JOIN_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> RepositoryResult<()> {
        // COALESCE keeps the stored value for every absent field, which is
        // what makes an empty partial update a no-op.
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                price = COALESCE(?, price),
                stock = COALESCE(?, stock),
                image_path = COALESCE(?, image_path),
                is_available = COALESCE(?, is_available)
            WHERE id = ?
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.stock)
        .bind(&changes.image_path)
        .bind(changes.is_available)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
