//! Process-local implementation of LedgerRepository.
//! Used by tests and by `STORAGE_BACKEND=memory` runs; nothing is persisted.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use crate::domain::{NewOrder, NewProduct, Order, OrderStatus, PaymentOutcome, Product};
use crate::ports::{LedgerRepository, RepositoryError, RepositoryResult};

#[derive(Default)]
struct LedgerState {
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<i64, Order>,
    next_product_id: i64,
    next_order_id: i64,
}

/// Every operation holds the single state lock for its whole duration, so
/// the stock check and decrement can never interleave.
#[derive(Default)]
pub struct InMemoryLedgerRepository {
    state: Mutex<LedgerState>,
}

impl InMemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(items: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    items.skip(offset).take(limit).collect()
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn insert_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut state = self.state.lock().await;
        state.next_product_id += 1;

        let created = Product {
            id: state.next_product_id,
            name: product.name.clone(),
            price: product.price.clone(),
            stock: product.stock,
            created_at: Utc::now(),
        };
        state.products.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_product(&self, id: i64) -> RepositoryResult<Product> {
        let state = self.state.lock().await;
        state
            .products
            .get(&id)
            .cloned()
            .ok_or_else(RepositoryError::product_not_found)
    }

    async fn list_products(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<Product>> {
        let state = self.state.lock().await;
        Ok(page(state.products.values().cloned(), offset, limit))
    }

    async fn list_orders_for_product(
        &self,
        product_id: i64,
        offset: i64,
        limit: i64,
    ) -> RepositoryResult<Vec<Order>> {
        let state = self.state.lock().await;
        if !state.products.contains_key(&product_id) {
            return Err(RepositoryError::product_not_found());
        }

        let orders = state
            .orders
            .values()
            .filter(|order| order.product_id == product_id)
            .cloned();
        Ok(page(orders, offset, limit))
    }

    async fn create_order(&self, order: &NewOrder) -> RepositoryResult<Order> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let product = state
            .products
            .get_mut(&order.product_id)
            .ok_or_else(RepositoryError::product_not_found)?;

        if !product.has_stock_for(order.quantity) {
            return Err(RepositoryError::InsufficientStock {
                product_id: product.id,
                requested: order.quantity,
                available: product.stock,
            });
        }

        product.stock -= order.quantity;
        state.next_order_id += 1;
        let created = Order {
            id: state.next_order_id,
            product_id: product.id,
            quantity: order.quantity,
            total_price: product.price_for(order.quantity),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            paid_at: None,
        };
        state.orders.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get_order(&self, id: i64) -> RepositoryResult<Order> {
        let state = self.state.lock().await;
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(RepositoryError::order_not_found)
    }

    async fn mark_order_paid(&self, id: i64) -> RepositoryResult<PaymentOutcome> {
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .get_mut(&id)
            .ok_or_else(RepositoryError::order_not_found)?;

        if order.mark_paid(Utc::now()) {
            Ok(PaymentOutcome::MarkedPaid(order.clone()))
        } else {
            Ok(PaymentOutcome::AlreadyPaid(order.clone()))
        }
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn new_product(stock: i32) -> NewProduct {
        NewProduct {
            name: "Test Monitor".to_string(),
            price: BigDecimal::from(300),
            stock,
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let repo = InMemoryLedgerRepository::new();
        let first = repo.insert_product(&new_product(1)).await.unwrap();
        let second = repo.insert_product(&new_product(1)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_failed_reservation_leaves_stock_untouched() {
        let repo = InMemoryLedgerRepository::new();
        let product = repo.insert_product(&new_product(2)).await.unwrap();

        let err = repo
            .create_order(&NewOrder {
                product_id: product.id,
                quantity: 5,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::InsufficientStock {
                requested: 5,
                available: 2,
                ..
            }
        ));
        assert_eq!(repo.get_product(product.id).await.unwrap().stock, 2);
    }

    #[tokio::test]
    async fn test_paging_skips_and_limits() {
        let repo = InMemoryLedgerRepository::new();
        for _ in 0..5 {
            repo.insert_product(&new_product(1)).await.unwrap();
        }

        let ids: Vec<i64> = repo
            .list_products(1, 2)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(repo.list_products(10, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_orders_for_unknown_product_is_not_found() {
        let repo = InMemoryLedgerRepository::new();
        let err = repo.list_orders_for_product(42, 0, 100).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
