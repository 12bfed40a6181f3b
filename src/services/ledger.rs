use bigdecimal::BigDecimal;
use std::sync::Arc;

use crate::domain::{NewOrder, NewProduct, Order, PaymentOutcome, Product};
use crate::error::AppError;
use crate::ports::{LedgerRepository, RepositoryError};
use crate::validation;

/// Owns products and orders and the stock-reservation invariant.
///
/// Input checks happen here; atomicity of the reservation is delegated to the
/// repository, which runs check-and-decrement as one unit per product.
#[derive(Clone)]
pub struct InventoryLedger {
    repository: Arc<dyn LedgerRepository>,
}

impl InventoryLedger {
    pub fn new(repository: Arc<dyn LedgerRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_product(
        &self,
        name: &str,
        price: BigDecimal,
        stock: i32,
    ) -> Result<Product, AppError> {
        let name = validation::validate_product_name(name)?;
        validation::validate_non_negative_price(&price)?;
        validation::validate_non_negative("stock", i64::from(stock))?;

        let product = self
            .repository
            .insert_product(&NewProduct { name, price, stock })
            .await?;

        tracing::info!(product_id = product.id, stock = product.stock, "Product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, AppError> {
        Ok(self.repository.get_product(id).await?)
    }

    /// Pages through products. Missing `skip`/`limit` fall back to 0 and the
    /// default page size.
    pub async fn list_products(
        &self,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Product>, AppError> {
        let (offset, limit) = validation::validate_page(skip, limit)?;
        Ok(self.repository.list_products(offset, limit).await?)
    }

    pub async fn list_product_orders(
        &self,
        product_id: i64,
        skip: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, AppError> {
        let (offset, limit) = validation::validate_page(skip, limit)?;
        Ok(self
            .repository
            .list_orders_for_product(product_id, offset, limit)
            .await?)
    }

    /// Reserves `quantity` units of the product and records a pending order.
    pub async fn create_order(&self, product_id: i64, quantity: i32) -> Result<Order, AppError> {
        validation::validate_positive_quantity(quantity)?;

        match self
            .repository
            .create_order(&NewOrder {
                product_id,
                quantity,
            })
            .await
        {
            Ok(order) => {
                tracing::info!(
                    order_id = order.id,
                    product_id,
                    quantity,
                    total_price = %order.total_price,
                    "Stock reserved for order"
                );
                Ok(order)
            }
            Err(err @ RepositoryError::InsufficientStock { .. }) => {
                tracing::warn!(product_id, quantity, "Order rejected: {}", err);
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_order(&self, id: i64) -> Result<Order, AppError> {
        Ok(self.repository.get_order(id).await?)
    }

    /// Confirms payment. Repeated confirmations are successful no-ops.
    pub async fn mark_order_paid(&self, order_id: i64) -> Result<PaymentOutcome, AppError> {
        let outcome = self.repository.mark_order_paid(order_id).await?;

        match &outcome {
            PaymentOutcome::MarkedPaid(_) => tracing::info!(order_id, "Order marked as paid"),
            PaymentOutcome::AlreadyPaid(_) => {
                tracing::info!(order_id, "Payment confirmation for already-paid order ignored")
            }
        }

        Ok(outcome)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.repository.ping().await?)
    }
}
