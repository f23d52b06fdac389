pub mod product_service;
pub mod user_service;

pub use product_service::{ProductService, ProductServiceError};
pub use user_service::{UserService, UserServiceError};
