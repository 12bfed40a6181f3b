pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod ports;
pub mod services;
pub mod validation;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::adapters::{InMemoryLedgerRepository, PostgresLedgerRepository, SqliteLedgerRepository};
use crate::openapi::ApiDoc;
use crate::services::InventoryLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: InventoryLedger,
}

impl AppState {
    pub fn new(ledger: InventoryLedger) -> Self {
        Self { ledger }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::new(InventoryLedger::new(Arc::new(PostgresLedgerRepository::new(
            pool,
        ))))
    }

    pub fn sqlite(pool: sqlx::SqlitePool) -> Self {
        Self::new(InventoryLedger::new(Arc::new(SqliteLedgerRepository::new(
            pool,
        ))))
    }

    /// State over a fresh, empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InventoryLedger::new(Arc::new(InMemoryLedgerRepository::new())))
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/products/:id", get(handlers::products::get_product))
        .route(
            "/products/:id/orders",
            get(handlers::products::list_product_orders),
        )
        .route("/orders", post(handlers::orders::create_order))
        .route("/orders/:id", get(handlers::orders::get_order))
        .route("/webhooks/payment", post(handlers::webhook::payment))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}

/// CORS layer: permissive when no origins are configured.
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    match allowed_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok())
                .collect();
            layer.allow_origin(origins)
        }
        None => layer.allow_origin(Any),
    }
}
