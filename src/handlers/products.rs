use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{Order, Product};
use crate::error::AppError;
use crate::handlers::Pagination;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(with = "crate::domain::money")]
    #[schema(value_type = f64, example = 300)]
    pub price: BigDecimal,
    pub stock: i32,
}

#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 422, description = "Invalid product")
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let product = state
        .ledger
        .create_product(&payload.name, payload.price, payload.stock)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.ledger.get_product(id).await?))
}

#[utoipa::path(
    get,
    path = "/products",
    params(Pagination),
    responses((status = 200, description = "A page of products", body = [Product])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(
        state
            .ledger
            .list_products(pagination.skip, pagination.limit)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/products/{id}/orders",
    params(("id" = i64, Path, description = "Product id"), Pagination),
    responses(
        (status = 200, description = "Orders placed against the product", body = [Order]),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn list_product_orders(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(
        state
            .ledger
            .list_product_orders(id, pagination.skip, pagination.limit)
            .await?,
    ))
}
