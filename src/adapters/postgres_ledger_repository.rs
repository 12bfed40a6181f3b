//! Postgres implementation of LedgerRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{NewOrder, NewProduct, Order, OrderStatus, PaymentOutcome, Product};
use crate::ports::{LedgerRepository, RepositoryError, RepositoryResult};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, created_at";
const ORDER_COLUMNS: &str = "id, product_id, quantity, total_price, status, created_at, paid_at";

/// Postgres-backed ledger repository.
#[derive(Clone)]
pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn insert_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, price, stock) VALUES ($1, $2, $3) RETURNING {}",
            PRODUCT_COLUMNS
        ))
        .bind(&product.name)
        .bind(&product.price)
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_domain())
    }

    async fn get_product(&self, id: i64) -> RepositoryResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ProductRow::into_domain)
            .ok_or_else(RepositoryError::product_not_found)
    }

    async fn list_products(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY id LIMIT $1 OFFSET $2",
            PRODUCT_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductRow::into_domain).collect())
    }

    async fn list_orders_for_product(
        &self,
        product_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Order>> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;
        if !exists {
            return Err(RepositoryError::product_not_found());
        }

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE product_id = $1 ORDER BY id LIMIT $2 OFFSET $3",
            ORDER_COLUMNS
        ))
        .bind(product_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_domain).collect()
    }

    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order> {
        // Dropping `tx` on any early return rolls the reservation back.
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent reservations against one product.
        let product = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
            PRODUCT_COLUMNS
        ))
        .bind(order.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .map(ProductRow::into_domain)
        .ok_or_else(RepositoryError::product_not_found)?;

        if !product.has_stock_for(order.quantity) {
            return Err(RepositoryError::InsufficientStock {
                product_id: product.id,
                requested: order.quantity,
                available: product.stock,
            });
        }

        let updated = sqlx::query(
            "UPDATE products SET stock = stock - $1 WHERE id = $2 AND stock >= $1",
        )
        .bind(order.quantity)
        .bind(product.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            return Err(RepositoryError::InsufficientStock {
                product_id: product.id,
                requested: order.quantity,
                available: product.stock,
            });
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (product_id, quantity, total_price, status) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(product.id)
        .bind(order.quantity)
        .bind(product.price_for(order.quantity))
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let created = row.into_domain()?;
        tx.commit().await?;

        Ok(created)
    }

    async fn get_order(&self, id: i64) -> RepositoryResult<Order> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(RepositoryError::order_not_found)?
            .into_domain()
    }

    async fn mark_order_paid(&self, id: i64) -> RepositoryResult<PaymentOutcome> {
        let updated = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $1, paid_at = NOW() \
             WHERE id = $2 AND status = $3 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(OrderStatus::Paid.as_str())
        .bind(id)
        .bind(OrderStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Ok(PaymentOutcome::MarkedPaid(row.into_domain()?)),
            // Nothing pending under that id: either already paid or missing.
            None => {
                let order = self.get_order(id).await?;
                Ok(PaymentOutcome::AlreadyPaid(order))
            }
        }
    }

    async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Internal row types for SQLx. Not exposed outside the adapter.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: BigDecimal,
    stock: i32,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            price: self.price,
            stock: self.stock,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    product_id: i64,
    quantity: i32,
    total_price: BigDecimal,
    status: String,
    created_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_domain(self) -> RepositoryResult<Order> {
        let status = self
            .status
            .parse::<OrderStatus>()
            .map_err(RepositoryError::InvalidData)?;

        Ok(Order {
            id: self.id,
            product_id: self.product_id,
            quantity: self.quantity,
            total_price: self.total_price,
            status,
            created_at: self.created_at,
            paid_at: self.paid_at,
        })
    }
}
