use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bigdecimal::BigDecimal;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use stockroom::adapters::SqliteLedgerRepository;
use stockroom::domain::{NewOrder, NewProduct, OrderStatus, PaymentOutcome};
use stockroom::ports::{LedgerRepository, RepositoryError};
use stockroom::{create_app, db, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

async fn open_store(path: &Path) -> SqlitePool {
    let pool = db::connect_sqlite(SqliteConnectOptions::new().filename(path), 5)
        .await
        .unwrap();
    db::run_sqlite_migrations(
        &pool,
        &Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations/sqlite"),
    )
    .await
    .unwrap();
    pool
}

async fn setup_test_store() -> (SqlitePool, PathBuf, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.db");
    let pool = open_store(&path).await;
    (pool, path, dir)
}

fn new_product(name: &str, price: &str, stock: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: BigDecimal::from_str(price).unwrap(),
        stock,
    }
}

#[tokio::test]
async fn test_reservation_is_all_or_nothing() {
    let (pool, _path, _dir) = setup_test_store().await;
    let repo = SqliteLedgerRepository::new(pool.clone());

    let product = repo
        .insert_product(&new_product("Test Speakers", "150", 2))
        .await
        .unwrap();

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

    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(order_count, 0);
    assert_eq!(repo.get_product(product.id).await.unwrap().stock, 2);

    let order = repo
        .create_order(&NewOrder {
            product_id: product.id,
            quantity: 2,
        })
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_price, BigDecimal::from(300));
    assert_eq!(repo.get_product(product.id).await.unwrap().stock, 0);

    assert!(matches!(
        repo.create_order(&NewOrder {
            product_id: product.id + 100,
            quantity: 1,
        })
        .await,
        Err(RepositoryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_mark_paid_is_idempotent() {
    let (pool, _path, _dir) = setup_test_store().await;
    let repo = SqliteLedgerRepository::new(pool);

    let product = repo
        .insert_product(&new_product("Keyboard", "49.90", 4))
        .await
        .unwrap();
    let order = repo
        .create_order(&NewOrder {
            product_id: product.id,
            quantity: 2,
        })
        .await
        .unwrap();
    assert_eq!(order.total_price, BigDecimal::from_str("99.80").unwrap());

    match repo.mark_order_paid(order.id).await.unwrap() {
        PaymentOutcome::MarkedPaid(paid) => {
            assert_eq!(paid.status, OrderStatus::Paid);
            assert!(paid.paid_at.is_some());
        }
        other => panic!("expected MarkedPaid, got {:?}", other),
    }
    assert!(matches!(
        repo.mark_order_paid(order.id).await.unwrap(),
        PaymentOutcome::AlreadyPaid(_)
    ));
    assert!(matches!(
        repo.mark_order_paid(order.id + 100).await,
        Err(RepositoryError::NotFound(_))
    ));
    assert_eq!(repo.get_product(product.id).await.unwrap().stock, 2);
}

#[tokio::test]
async fn test_data_survives_reopening_the_file() {
    let (pool, path, _dir) = setup_test_store().await;
    let repo = SqliteLedgerRepository::new(pool.clone());
    let product = repo
        .insert_product(&new_product("Test Monitor", "300", 10))
        .await
        .unwrap();
    let order = repo
        .create_order(&NewOrder {
            product_id: product.id,
            quantity: 3,
        })
        .await
        .unwrap();
    pool.close().await;

    let reopened = SqliteLedgerRepository::new(open_store(&path).await);
    assert_eq!(reopened.get_product(product.id).await.unwrap().stock, 7);
    assert_eq!(
        reopened
            .list_orders_for_product(product.id, 0, 100)
            .await
            .unwrap(),
        vec![order]
    );
    assert_eq!(reopened.list_products(0, 100).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_never_oversell() {
    let (pool, _path, _dir) = setup_test_store().await;
    let repo: Arc<dyn LedgerRepository> = Arc::new(SqliteLedgerRepository::new(pool));
    let product = repo
        .insert_product(&new_product("Limited Edition", "10", 3))
        .await
        .unwrap();
    let product_id = product.id;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.create_order(&NewOrder {
                    product_id,
                    quantity: 1,
                })
                .await
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(RepositoryError::InsufficientStock { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(rejected, 7);
    assert_eq!(repo.get_product(product_id).await.unwrap().stock, 0);
}

#[tokio::test]
async fn test_http_round_trip_over_sqlite() {
    let (pool, _path, _dir) = setup_test_store().await;
    let app = create_app(AppState::sqlite(pool));

    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"name": "Test Cable", "price": 19.99, "stock": 5}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let product: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(product["price"].to_string(), "19.99");

    let request = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"product_id": product["id"], "quantity": 3}).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let order: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(order["total_price"].to_string(), "59.97");
    assert_eq!(order["status"], "pending");
}
