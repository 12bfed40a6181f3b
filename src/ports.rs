//! Storage port for the inventory ledger.
//! Adapters under `crate::adapters` implement it for concrete stores.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{NewOrder, NewProduct, Order, PaymentOutcome, Product};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn product_not_found() -> Self {
        RepositoryError::NotFound("Product".to_string())
    }

    pub fn order_not_found() -> Self {
        RepositoryError::NotFound("Order".to_string())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence for products and orders.
///
/// Each call acquires its own connection or transaction and releases it
/// before returning, on success and on error.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn insert_product(&self, product: &NewProduct) -> RepositoryResult<Product>;

    async fn get_product(&self, id: i64) -> RepositoryResult<Product>;

    /// Products ordered by id.
    async fn list_products(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<Product>>;

    /// Orders placed against `product_id`, ordered by id. Fails with
    /// `NotFound` when the product itself does not exist.
    async fn list_orders_for_product(
        &self,
        product_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Order>>;

    /// Reserves stock and records a pending order as one atomic unit.
    /// Concurrent calls for the same product are serialized so stock never
    /// goes negative.
    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order>;

    async fn get_order(&self, id: i64) -> RepositoryResult<Order>;

    /// Flips a pending order to paid. An already-paid order is reported as
    /// `PaymentOutcome::AlreadyPaid`, not as an error.
    async fn mark_order_paid(&self, id: i64) -> RepositoryResult<PaymentOutcome>;

    /// Cheap round trip used by the health probe.
    async fn ping(&self) -> RepositoryResult<()>;
}
