use crate::models::user::User;
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Row not found")]
    NotFound,
    #[error("Unique constraint violated")]
    AlreadyExists,
    #[error("Foreign key constraint violated")]
    ForeignKey,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> RepositoryResult<User>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<User>>;
    /// Full-row update with already-resolved values. Callers decide how
    /// absent fields fall back to current values.
    async fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> RepositoryResult<()>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;
    /// Case-insensitive substring match on name or email. An empty needle
    /// matches every row.
    async fn search_users(&self, text: &str) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Turn SQLite constraint failures into typed errors so callers can answer
/// with a validation envelope instead of a 500.
pub(crate) fn map_constraint(e: sqlx::Error) -> RepositoryError {
    let message = e.to_string();
    if message.contains("UNIQUE") {
        RepositoryError::AlreadyExists
    } else if message.contains("FOREIGN KEY") {
        RepositoryError::ForeignKey
    } else {
        RepositoryError::Database(e)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (name, email, password, phone) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(phone)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;

        let id = result.last_insert_rowid();
        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, phone FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, phone FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, phone FROM users WHERE phone = ?",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(
        &self,
        id: i64,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, password = ?, phone = ? WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(password)
        .bind(phone)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        // Fails with ForeignKey while the user still owns products.
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_constraint)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(&self) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, phone FROM users ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn search_users(&self, text: &str) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, phone
            FROM users
            WHERE name LIKE '%' || ? || '%' OR email LIKE '%' || ? || '%'
            ORDER BY id
            "#,
        )
        .bind(text)
        .bind(text)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
