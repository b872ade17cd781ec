//! Product catalog DTOs

use chrono::{DateTime, Utc};
use domain_debt::Product;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    /// Selling unit price, e.g. "12.50"
    pub unit_price: String,
    /// Optional cost price
    pub purchase_price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub unit_price: String,
    pub purchase_price: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub unit_price: String,
    pub purchase_price: Option<String>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            unit_price: product.unit_price.to_string(),
            purchase_price: product.purchase_price.map(|p| p.to_string()),
            deleted: product.state.is_deleted(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}
