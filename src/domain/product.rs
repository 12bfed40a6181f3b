use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A stocked product. Stock only ever goes down, through order placement.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(with = "super::money")]
    #[schema(value_type = f64, example = 300)]
    pub price: BigDecimal,
    pub stock: i32,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether `quantity` units can be reserved without driving stock negative.
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }

    /// Total charged for `quantity` units at the current price.
    pub fn price_for(&self, quantity: i32) -> BigDecimal {
        &self.price * &BigDecimal::from(quantity)
    }
}

/// Validated input for a product insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
}
