use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::OrderStatus;
use crate::error::AppError;
use crate::AppState;

/// Payment notification from the payment provider. Not authenticated.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PaymentWebhook {
    pub order_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentWebhookResponse {
    pub message: String,
    pub order_id: i64,
    pub status: OrderStatus,
}

/// Delivery is at-least-once, so repeats for a paid order answer 200.
#[utoipa::path(
    post,
    path = "/webhooks/payment",
    request_body = PaymentWebhook,
    responses(
        (status = 200, description = "Order is paid", body = PaymentWebhookResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "Webhooks"
)]
pub async fn payment(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhook>,
) -> Result<Json<PaymentWebhookResponse>, AppError> {
    let outcome = state.ledger.mark_order_paid(payload.order_id).await?;

    Ok(Json(PaymentWebhookResponse {
        message: outcome.message(),
        order_id: outcome.order().id,
        status: outcome.order().status,
    }))
}
