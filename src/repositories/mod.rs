pub mod product_repository;
pub mod user_repository;

pub use product_repository::{ProductRepository, SqliteProductRepository};
pub use user_repository::{RepositoryError, RepositoryResult, SqliteUserRepository, UserRepository};
