use crate::models::user::UserView;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub image_path: Option<String>,
    pub is_available: bool,
}

/// A product joined with its owner's public fields, the shape every product
/// endpoint returns.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithOwner {
    #[serde(flatten)]
    pub product: Product,
    pub user: UserView,
}

/// Fully validated input for a product insert.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub image_path: Option<String>,
    pub is_available: bool,
}

/// Partial update for a product. `None` means "leave the column as it is";
/// there is no way to clear a column back to null through this type.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub image_path: Option<String>,
    pub is_available: Option<bool>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image_path.is_none()
            && self.is_available.is_none()
    }
}
