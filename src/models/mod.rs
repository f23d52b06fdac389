pub mod product;
pub mod user;

pub use product::{NewProduct, Product, ProductChanges, ProductWithOwner};
pub use user::{User, UserView};
