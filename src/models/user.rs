use serde::Serialize;
use sqlx::FromRow;

/// Database row for a user. Deliberately does not derive `Serialize`: the
/// `password` column holds the argon2 hash and must never reach a response
/// body. Convert to [`UserView`] before serializing.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Outward-facing representation of a user: everything except credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}
