use crate::models::user::{User, UserView};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::validation::{as_text, strip_nulls, validate, Field, Rule, ValidationErrors};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("User not found")]
    UserNotFound,
    #[error("User still owns products")]
    UserInUse,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new user. Input keys follow the public API contract:
    /// `nama`, `surel`, `sandi`, `telp`.
    pub async fn register(&self, body: &Map<String, Value>) -> Result<UserView, UserServiceError> {
        let body = strip_nulls(body);

        let rules = [
            Field::new("nama").rule(Rule::Required).rule(Rule::MaxLen(255)),
            Field::new("surel").rule(Rule::Required).rule(Rule::Email),
            Field::new("sandi").rule(Rule::Required).rule(Rule::MinLen(6)),
            Field::new("telp").rule(Rule::Required),
        ];

        let mut errors = match validate(&body, &rules) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        self.check_unique(&body, &mut errors, None).await?;

        if !errors.is_empty() {
            return Err(UserServiceError::Validation(errors));
        }

        let name = body.get("nama").and_then(as_text).unwrap_or_default();
        let email = body.get("surel").and_then(as_text).unwrap_or_default();
        let password = body.get("sandi").and_then(as_text).unwrap_or_default();
        let phone = body.get("telp").and_then(as_text).unwrap_or_default();

        let password_hash = self.hash_password(&password)?;

        match self
            .repository
            .create_user(&name, &email, &password_hash, &phone)
            .await
        {
            Ok(user) => Ok(user.into()),
            // Backstop for a concurrent insert racing past the checks above.
            Err(RepositoryError::AlreadyExists) => {
                let mut errors = ValidationErrors::new();
                errors.add("surel", "surel atau telp sudah digunakan!");
                Err(UserServiceError::Validation(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<UserView>, UserServiceError> {
        let users = self.repository.list_users().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    pub async fn find(&self, id: i64) -> Result<Option<UserView>, UserServiceError> {
        Ok(self.repository.find_by_id(id).await?.map(Into::into))
    }

    /// Substring search over name and email. An empty needle matches every
    /// row, which is how the public contract has always behaved.
    pub async fn search(&self, text: &str) -> Result<Vec<UserView>, UserServiceError> {
        let users = self.repository.search_users(text).await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Partial update: every absent field falls back to the user's current
    /// value; a present `sandi` is re-hashed before storage.
    pub async fn update(
        &self,
        id: i64,
        body: &Map<String, Value>,
    ) -> Result<UserView, UserServiceError> {
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::UserNotFound)?;

        let body = strip_nulls(body);

        let rules = [
            Field::new("nama").rule(Rule::MaxLen(255)),
            Field::new("surel").rule(Rule::Email),
            Field::new("sandi").rule(Rule::MinLen(6)),
        ];

        let mut errors = match validate(&body, &rules) {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        self.check_unique(&body, &mut errors, Some(user.id)).await?;

        if !errors.is_empty() {
            return Err(UserServiceError::Validation(errors));
        }

        let resolved = self.resolve_update(&user, &body)?;

        match self
            .repository
            .update_user(
                user.id,
                &resolved.name,
                &resolved.email,
                &resolved.password,
                &resolved.phone,
            )
            .await
        {
            Ok(()) => Ok(resolved.into()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(RepositoryError::AlreadyExists) => {
                let mut errors = ValidationErrors::new();
                errors.add("surel", "surel atau telp sudah digunakan!");
                Err(UserServiceError::Validation(errors))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            // The datastore refuses to orphan products owned by this user.
            Err(RepositoryError::ForeignKey) => Err(UserServiceError::UserInUse),
            Err(e) => Err(e.into()),
        }
    }

    /// Uniqueness checks for email and phone, skipping fields that already
    /// failed a format rule. `exclude` ignores the user's own row on update.
    async fn check_unique(
        &self,
        body: &Map<String, Value>,
        errors: &mut ValidationErrors,
        exclude: Option<i64>,
    ) -> Result<(), UserServiceError> {
        if !errors.0.contains_key("surel") {
            if let Some(email) = body.get("surel").and_then(as_text) {
                if let Some(existing) = self.repository.find_by_email(&email).await? {
                    if Some(existing.id) != exclude {
                        errors.add("surel", "surel sudah digunakan!");
                    }
                }
            }
        }

        if !errors.0.contains_key("telp") {
            if let Some(phone) = body.get("telp").and_then(as_text) {
                if let Some(existing) = self.repository.find_by_phone(&phone).await? {
                    if Some(existing.id) != exclude {
                        errors.add("telp", "telp sudah digunakan!");
                    }
                }
            }
        }

        Ok(())
    }

    fn resolve_update(
        &self,
        current: &User,
        body: &Map<String, Value>,
    ) -> Result<User, UserServiceError> {
        let password = match body.get("sandi").and_then(as_text) {
            Some(plain) => self.hash_password(&plain)?,
            None => current.password.clone(),
        };

        Ok(User {
            id: current.id,
            name: body
                .get("nama")
                .and_then(as_text)
                .unwrap_or_else(|| current.name.clone()),
            email: body
                .get("surel")
                .and_then(as_text)
                .unwrap_or_else(|| current.email.clone()),
            password,
            phone: body
                .get("telp")
                .and_then(as_text)
                .unwrap_or_else(|| current.phone.clone()),
        })
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::Hashing(e.to_string()))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn ahmad() -> User {
        User {
            id: 1,
            name: "Ahmad".to_string(),
            email: "a@x.com".to_string(),
            password: "$argon2id$stub".to_string(),
            phone: "08123".to_string(),
        }
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email()
            .returning(|_| Box::pin(async { Ok(None) }));
        mock.expect_find_by_phone()
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = UserService::new(Arc::new(mock));
        let result = service
            .register(&body(json!({
                "nama": "Ahmad",
                "surel": "a@x.com",
                "sandi": "abc",
                "telp": "08123"
            })))
            .await;

        match result {
            Err(UserServiceError::Validation(errors)) => {
                assert_eq!(errors.0["sandi"], "sandi minimal 6 karakter!");
            }
            other => panic!("expected validation error, got {:?}", other.map(|u| u.id)),
        }
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_email()
            .returning(|_| Box::pin(async { Ok(Some(ahmad())) }));
        mock.expect_find_by_phone()
            .returning(|_| Box::pin(async { Ok(None) }));

        let service = UserService::new(Arc::new(mock));
        let result = service
            .register(&body(json!({
                "nama": "Budi",
                "surel": "a@x.com",
                "sandi": "rahasia1",
                "telp": "08999"
            })))
            .await;

        match result {
            Err(UserServiceError::Validation(errors)) => {
                assert_eq!(errors.0["surel"], "surel sudah digunakan!");
            }
            other => panic!("expected validation error, got {:?}", other.map(|u| u.id)),
        }
    }

    #[tokio::test]
    async fn update_keeps_own_email() {
        let mut mock = MockUserRepository::new();
        mock.expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(Some(ahmad())) }));
        // The user's own row does not count as a collision.
        mock.expect_find_by_email()
            .returning(|_| Box::pin(async { Ok(Some(ahmad())) }));
        mock.expect_update_user()
            .returning(|_, _, _, _, _| Box::pin(async { Ok(()) }));

        let service = UserService::new(Arc::new(mock));
        let result = service
            .update(1, &body(json!({"surel": "a@x.com", "nama": "Ahmad S"})))
            .await;

        let view = result.expect("update should succeed");
        assert_eq!(view.name, "Ahmad S");
        assert_eq!(view.email, "a@x.com");
    }

    #[tokio::test]
    async fn hashed_password_is_not_plaintext() {
        let service = UserService::new(Arc::new(MockUserRepository::new()));
        let hash = service.hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(service.verify_password("secret1", &hash));
        assert!(!service.verify_password("secret2", &hash));
    }
}
