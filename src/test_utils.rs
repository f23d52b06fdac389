pub mod test_helpers {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(":memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;

        let options = SqliteConnectOptions::from_str(db_path)?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a test user with a hashed password, returning the new row id
    pub async fn insert_test_user(
        pool: &SqlitePool,
        name: &str,
        email: &str,
        password: &str,
        phone: &str,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result =
            sqlx::query("INSERT INTO users (name, email, password, phone) VALUES (?, ?, ?, ?)")
                .bind(name)
                .bind(email)
                .bind(password_hash)
                .bind(phone)
                .execute(pool)
                .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a test product owned by `user_id`, returning the new row id
    pub async fn insert_test_product(
        pool: &SqlitePool,
        user_id: i64,
        name: &str,
        price: f64,
        stock: i64,
        is_available: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO products (user_id, name, price, stock, is_available)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(is_available)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
