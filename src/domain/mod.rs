//! Inventory domain entities.
//! Plain data plus the few rules that do not depend on storage.

pub mod money;
pub mod order;
pub mod product;

pub use order::{NewOrder, Order, OrderStatus, PaymentOutcome};
pub use product::{NewProduct, Product};
