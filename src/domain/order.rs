use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Payment state of an order. `Paid` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// An order against a single product. `total_price` is frozen at creation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    #[serde(with = "super::money")]
    #[schema(value_type = f64, example = 900)]
    pub total_price: BigDecimal,
    pub status: OrderStatus,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Applies the pending -> paid transition. Returns false when the order
    /// was already paid, leaving it untouched.
    pub fn mark_paid(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_paid() {
            return false;
        }
        self.status = OrderStatus::Paid;
        self.paid_at = Some(at);
        true
    }
}

/// Validated input for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub product_id: i64,
    pub quantity: i32,
}

/// Result of a payment confirmation. Both variants are successes.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    MarkedPaid(Order),
    AlreadyPaid(Order),
}

impl PaymentOutcome {
    pub fn order(&self) -> &Order {
        match self {
            PaymentOutcome::MarkedPaid(order) | PaymentOutcome::AlreadyPaid(order) => order,
        }
    }

    pub fn message(&self) -> String {
        match self {
            PaymentOutcome::MarkedPaid(order) => {
                format!("Order {} has been marked as paid", order.id)
            }
            PaymentOutcome::AlreadyPaid(_) => "Order is already marked as paid".to_string(),
        }
    }
}
